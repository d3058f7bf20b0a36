//! Gillespie direct-method stochastic simulation. §4.F.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::crn::Crn;
use crate::error::Error;
use crate::reaction::Reaction;
use crate::result::StoResult;
use crate::schema::EnumerationCache;
use crate::species::Species;

/// Bounds and RNG seed for a stochastic run. Exactly one of `t`/`steps`
/// must be set (§4.F, §7: specifying both is an input error); the other
/// bound is then treated as unbounded (`t = ∞` or `steps = 1000`). `seed`
/// pins the RNG for reproducible trajectories (§4.F's determinism
/// guarantee); `None` draws from entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoOptions {
    pub t: Option<f64>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
}

/// Runs the Gillespie direct-method simulator on `crn` from `initial`
/// molecule counts (species omitted from the map default to 0), stopping
/// at whichever of `opts.t`/`opts.steps` is set, or exhaustion, whichever
/// comes first.
///
/// # Errors
/// Returns [`Error::Input`] if `opts.t`/`opts.steps` aren't set exactly
/// one each, `initial` gives a negative count, or a key of `initial` is
/// the reserved name `time`.
///
/// Unlike the deterministic simulator, `initial` isn't required to name
/// only species appearing literally in `crn`'s reactions: a schema
/// reaction's concrete reactants (e.g. `Stack1<101010>`) are matched
/// against its pattern dynamically and never get their own index in
/// [`Crn::species`], so the live state here is built straight from
/// `initial` rather than filtered through it (§4.F's `S_0`).
pub fn simulate(
    crn: &Crn,
    initial: &HashMap<String, i64>,
    opts: StoOptions,
) -> Result<StoResult, Error> {
    if opts.t.is_none() && opts.steps.is_none() {
        return Err(Error::Input(
            "stochastic simulation requires at least one of an end time or a step bound".into(),
        ));
    }
    if opts.t.is_some() && opts.steps.is_some() {
        return Err(Error::Input(
            "stochastic simulation accepts at most one of an end time or a step bound".into(),
        ));
    }
    let t_bound = opts.t.unwrap_or(f64::INFINITY);
    let step_bound = opts.steps.unwrap_or(1000);

    let mut state: HashMap<Species, i64> = HashMap::new();
    for (name, &count) in initial {
        if count < 0 {
            return Err(Error::Input(format!(
                "initial count for '{name}' must be nonnegative, got {count}"
            )));
        }
        if count > 0 {
            state.insert(Species::new(name.clone())?, count);
        }
    }

    log::debug!(
        "stochastic simulation: {} reactions, t_bound={t_bound}, step_bound={step_bound}",
        crn.reactions().len()
    );

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let schema_reactions: Vec<(usize, &Reaction)> = crn
        .reactions()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_schema())
        .collect();
    let mut cache = EnumerationCache::new();

    let mut t = 0.0;
    let mut times = vec![t];
    let mut series: HashMap<String, Vec<i64>> = state
        .iter()
        .map(|(s, &c)| (s.name().to_string(), vec![c]))
        .collect();
    let mut fired = Vec::new();
    let mut exhausted = false;
    let mut step_count = 0;

    while t < t_bound && step_count < step_bound {
        let concrete = concrete_reaction_set(crn, &schema_reactions, &mut cache, &state)?;

        let mut rates = Vec::with_capacity(concrete.len());
        let mut total = 0.0;
        for rxn in &concrete {
            let a = rxn.propensity(&state);
            if !a.is_finite() {
                return Err(Error::Numeric(format!(
                    "reaction {rxn} produced a non-finite propensity ({a}) at t={t}"
                )));
            }
            rates.push(a);
            total += a;
        }

        if total <= 0.0 {
            exhausted = true;
            break;
        }

        let delta = -(1.0 - rng.gen::<f64>()).ln() / total;
        let pick = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (i, &a) in rates.iter().enumerate() {
            cumulative += a;
            if pick < cumulative {
                chosen = Some(i);
                break;
            }
        }
        let rxn = concrete[chosen.ok_or_else(|| {
            Error::Numeric("propensity cumulative sum did not cover the draw".into())
        })?]
        .clone();

        apply(&mut state, &rxn, &mut series, times.len());
        t += delta;
        times.push(t);
        let by_name: HashMap<&str, i64> =
            state.iter().map(|(s, &c)| (s.name(), c)).collect();
        for (name, counts) in series.iter_mut() {
            counts.push(by_name.get(name.as_str()).copied().unwrap_or(0));
        }
        fired.push(rxn);
        step_count += 1;
    }

    Ok(StoResult::new(times, series, fired, exhausted))
}

fn concrete_reaction_set<'a>(
    crn: &'a Crn,
    schema_reactions: &[(usize, &'a Reaction)],
    cache: &'a mut EnumerationCache,
    state: &HashMap<Species, i64>,
) -> Result<Vec<Reaction>, Error> {
    let expansions = cache.enumerate_all(schema_reactions, state)?;
    let schema_indices: std::collections::HashSet<usize> =
        schema_reactions.iter().map(|&(i, _)| i).collect();

    let mut all = Vec::new();
    for (i, rxn) in crn.reactions().iter().enumerate() {
        if schema_indices.contains(&i) {
            all.extend(expansions.get(&i).cloned().unwrap_or_default());
        } else {
            all.push(rxn.clone());
        }
    }
    Ok(all)
}

/// Applies `rxn` to `state`: subtracts reactant coefficients, adds product
/// coefficients, drops any species whose count reaches 0, and back-fills a
/// newly appeared product species' time series with zeros up to
/// `samples_so_far` before its first real count is appended by the caller
/// (§4.F step 6).
fn apply(
    state: &mut HashMap<Species, i64>,
    rxn: &Reaction,
    series: &mut HashMap<String, Vec<i64>>,
    samples_so_far: usize,
) {
    for (s, c) in rxn.reactants().iter() {
        if s.is_nothing() {
            continue;
        }
        if let Some(count) = state.get_mut(s) {
            *count -= c;
        }
    }
    for (s, c) in rxn.products().iter() {
        if s.is_nothing() {
            continue;
        }
        *state.entry(s.clone()).or_insert(0) += c;
        series
            .entry(s.name().to_string())
            .or_insert_with(|| vec![0; samples_so_far]);
    }
    state.retain(|_, &mut count| count > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    #[test]
    fn requires_at_least_one_bound() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![a >> b]).unwrap();
        let err = simulate(&crn, &HashMap::new(), StoOptions::default());
        assert!(matches!(err, Err(Error::Input(_))));
    }

    #[test]
    fn rejects_both_bounds_set() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![a >> b]).unwrap();
        let err = simulate(
            &crn,
            &HashMap::new(),
            StoOptions {
                t: Some(1.0),
                steps: Some(10),
                ..Default::default()
            },
        );
        assert!(matches!(err, Err(Error::Input(_))));
    }

    #[test]
    fn accepts_initial_species_absent_from_the_reaction_set() {
        // a schema reactant's concrete instance never gets its own Crn
        // index; the live state must still accept it.
        let groups = [("rest".to_string(), "[01]*".to_string())];
        let halt = Species::new("halt").unwrap();
        let s1 = Species::new("s1").unwrap();
        let top1 = Species::schema("Stack<{rest}1>", groups).unwrap();
        let empty = Species::new("Stack<>").unwrap();
        let crn = Crn::new(vec![
            s1.clone() + empty.clone() >> halt + empty,
            s1 + top1 >> Species::nothing(),
        ])
        .unwrap();

        let mut initial = HashMap::new();
        initial.insert("s1".to_string(), 1);
        initial.insert("Stack<101>".to_string(), 1);
        let result = simulate(
            &crn,
            &initial,
            StoOptions {
                steps: Some(10),
                seed: Some(3),
                ..Default::default()
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn non_finite_propensity_is_a_numeric_error() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![(a >> b).with_k(f64::INFINITY)]).unwrap();
        let mut initial = HashMap::new();
        initial.insert("A".to_string(), 1);
        let result = simulate(
            &crn,
            &initial,
            StoOptions {
                steps: Some(10),
                seed: Some(1),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Numeric(_))));
    }

    #[test]
    fn exhausts_when_no_reaction_applies() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![a >> b]).unwrap();
        let initial = HashMap::new(); // A starts at 0, reaction never applicable
        let result = simulate(
            &crn,
            &initial,
            StoOptions {
                steps: Some(10),
                seed: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.exhausted);
    }

    #[test]
    fn same_seed_yields_identical_trajectories() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![(a.clone() >> b).with_k(1.0)]).unwrap();
        let mut initial = HashMap::new();
        initial.insert("A".to_string(), 5);

        let opts = StoOptions {
            steps: Some(5),
            seed: Some(42),
            ..Default::default()
        };
        let r1 = simulate(&crn, &initial, opts).unwrap();
        let r2 = simulate(&crn, &initial, opts).unwrap();
        assert_eq!(r1.time(), r2.time());
    }

    #[test]
    fn step_ordering_is_apply_then_advance_then_append() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![(a.clone() >> b.clone()).with_k(1.0)]).unwrap();
        let mut initial = HashMap::new();
        initial.insert("A".to_string(), 1);
        let result = simulate(
            &crn,
            &initial,
            StoOptions {
                steps: Some(1),
                seed: Some(7),
                ..Default::default()
            },
        )
        .unwrap();
        // one accepted event: the initial sample plus exactly one more
        assert_eq!(result.time().len(), 2);
        assert_eq!(result.species("B").unwrap(), &[0, 1]);
    }
}
