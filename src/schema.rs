//! Schema engine: enumerates the concrete reactions a *schema reaction*
//! (one with at least one pattern-species reactant) stands for, against a
//! live population state. See §4.C.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::error::Error;
use crate::expression::Expression;
use crate::reaction::Reaction;
use crate::species::{self, Species};

/// Enumerates the concrete reactions `rxn` stands for given the live
/// molecule counts in `state`. Non-schema reactions enumerate to exactly
/// themselves. Candidate tuples are drawn, with repetition, from the
/// species in `state` with positive count, in sorted order, so that two
/// calls against an equal `state` produce identical output in identical
/// order (§4.F's reproducibility and ordering guarantees).
///
/// A candidate tuple that fails to match any schema reactant's regex is
/// silently skipped (a local negative result, §7). A tuple in which two
/// schema reactants capture the same group name to different values is a
/// hard [`Error::Schema`]: it signals a malformed reaction schema rather
/// than an ordinary runtime non-match.
pub fn enumerate(rxn: &Reaction, state: &HashMap<Species, i64>) -> Result<Vec<Reaction>, Error> {
    let schema_reactants = rxn.schema_reactants();
    if schema_reactants.is_empty() {
        return Ok(vec![rxn.clone()]);
    }

    let mut candidates: Vec<Species> = state
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(s, _)| s.clone())
        .collect();
    candidates.sort();

    let mut concrete_reactions = Vec::new();
    let combinations = std::iter::repeat(candidates.iter())
        .take(schema_reactants.len())
        .multi_cartesian_product();

    'tuple: for tuple in combinations {
        let mut groups: BTreeMap<String, String> = BTreeMap::new();
        let mut schema_contrib = Expression::empty();

        for (schema_sp, candidate) in schema_reactants.iter().zip(tuple.iter().copied()) {
            let captured = match schema_sp.matches(candidate)? {
                Some(captured) => captured,
                None => continue 'tuple,
            };
            for (name, value) in captured {
                match groups.get(&name) {
                    Some(existing) if existing != &value => {
                        return Err(Error::Schema(format!(
                            "group '{name}' captured with conflicting values '{existing}' and \
                             '{value}' across reactants of reaction {rxn}"
                        )));
                    }
                    _ => {
                        groups.insert(name, value);
                    }
                }
            }
            let coeff = rxn.reactants().coeff(schema_sp);
            schema_contrib = schema_contrib + (candidate.clone() * coeff);
        }

        let mut reactants = Expression::empty();
        for (s, c) in rxn.reactants().iter() {
            if !s.is_schema() {
                reactants = reactants + (s.clone() * c);
            }
        }
        reactants = reactants + schema_contrib;

        let mut products = Expression::empty();
        for (s, c) in rxn.products().iter() {
            if s.is_schema() {
                let name = species::format_template(s.name(), &groups)?;
                products = products + (Species::new(name)? * c);
            } else {
                products = products + (s.clone() * c);
            }
        }

        concrete_reactions.push(Reaction::new(reactants, products).with_k(rxn.k()));
    }

    Ok(concrete_reactions)
}

/// Memoizes [`enumerate`] across a batch of schema reactions, keyed by the
/// sorted multiset of concrete species currently present. Invalidated
/// whenever that multiset changes, which happens on every accepted SSA
/// step (§4.C: "implementations may cache enumerations keyed by the
/// multiset of concrete species currently present, invalidated on any
/// state change").
#[derive(Debug, Default)]
pub struct EnumerationCache {
    last_key: Option<Vec<(String, i64)>>,
    results: HashMap<usize, Vec<Reaction>>,
}

impl EnumerationCache {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the concrete reactions enumerated for each `(index,
    /// reaction)` pair in `schema_reactions`, recomputing only if `state`'s
    /// live species multiset differs from the last call.
    pub fn enumerate_all<'a>(
        &'a mut self,
        schema_reactions: &[(usize, &Reaction)],
        state: &HashMap<Species, i64>,
    ) -> Result<&'a HashMap<usize, Vec<Reaction>>, Error> {
        let key = state_key(state);
        if self.last_key.as_ref() != Some(&key) {
            self.results.clear();
            for &(idx, rxn) in schema_reactions {
                self.results.insert(idx, enumerate(rxn, state)?);
            }
            self.last_key = Some(key);
            log::trace!(
                "schema enumeration cache miss: {} live species, {} schema reactions re-enumerated",
                key.len(),
                schema_reactions.len()
            );
        }
        Ok(&self.results)
    }
}

fn state_key(state: &HashMap<Species, i64>) -> Vec<(String, i64)> {
    let mut key: Vec<(String, i64)> = state
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(s, &c)| (s.name().to_string(), c))
        .collect();
    key.sort();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    fn stack_schema() -> (Species, Species) {
        let s1 = Species::schema(
            "Stack1<{rest}{top}>",
            [("top".to_string(), "[01]".to_string())],
        )
        .unwrap();
        let s2 = Species::schema(
            "Stack2<{rest}{top}>",
            [("top".to_string(), "[01]".to_string())],
        )
        .unwrap();
        (s1, s2)
    }

    #[test]
    fn non_schema_reaction_enumerates_to_itself() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let rxn = a >> b;
        let state = HashMap::new();
        let enumerated = enumerate(&rxn, &state).unwrap();
        assert_eq!(enumerated, vec![rxn]);
    }

    #[test]
    fn schema_reaction_enumerates_against_matching_state() {
        let (s1, _s2) = stack_schema();
        let pop = Species::new("Pop").unwrap();
        let rxn = s1.clone() >> pop.clone();

        let concrete = Species::new("Stack1<1011>").unwrap();
        let mut state = HashMap::new();
        state.insert(concrete.clone(), 1);

        let enumerated = enumerate(&rxn, &state).unwrap();
        assert_eq!(enumerated.len(), 1);
        assert_eq!(enumerated[0].reactants().coeff(&concrete), 1);
        assert_eq!(enumerated[0].products().coeff(&pop), 1);
    }

    #[test]
    fn non_matching_candidate_is_skipped_not_errored() {
        let (s1, _s2) = stack_schema();
        let pop = Species::new("Pop").unwrap();
        let rxn = s1 >> pop;

        let mismatched = Species::new("NotAStack").unwrap();
        let mut state = HashMap::new();
        state.insert(mismatched, 1);

        let enumerated = enumerate(&rxn, &state).unwrap();
        assert!(enumerated.is_empty());
    }

    #[test]
    fn conflicting_capture_is_a_hard_error() {
        let s1 = Species::schema("X{g}", [("g".to_string(), "[0-9]".to_string())]).unwrap();
        let s2 = Species::schema("Y{g}", [("g".to_string(), "[0-9]".to_string())]).unwrap();
        let out = Species::new("Out").unwrap();
        let rxn = (s1 + s2) >> out;

        let c1 = Species::new("X1").unwrap();
        let c2 = Species::new("Y2").unwrap();
        let mut state = HashMap::new();
        state.insert(c1, 1);
        state.insert(c2, 1);

        assert!(enumerate(&rxn, &state).is_err());
    }

    #[test]
    fn cache_recomputes_only_on_state_change() {
        let (s1, _) = stack_schema();
        let pop = Species::new("Pop").unwrap();
        let rxn = s1 >> pop;

        let concrete = Species::new("Stack1<10>").unwrap();
        let mut state = HashMap::new();
        state.insert(concrete, 1);

        let mut cache = EnumerationCache::new();
        let pairs = [(0usize, &rxn)];
        let first = cache.enumerate_all(&pairs, &state).unwrap().clone();
        let second = cache.enumerate_all(&pairs, &state).unwrap().clone();
        assert_eq!(first, second);
    }
}
