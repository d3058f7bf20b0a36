//! Model-description export: writes a [`Crn`] and an initial state to the
//! PySCeS Model Description Language text format used by this crate's
//! reference stochastic-simulation tooling. §6 Persisted state.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::crn::Crn;
use crate::error::Error;
use crate::expression::Expression;
use crate::species::NOTHING;

/// Renders `crn` and `amounts` (species omitted from the map default to 0)
/// to the `.psc` text format: a `# Reactions` block (one `Ri:` per
/// reaction, reactants `>` products, then its discrete-flux propensity
/// term), a `# Rate constants` block, and a `# Initial Species Counts`
/// block. `nothing` is rendered as the reserved `$pool` token and omitted
/// from the initial-counts block, matching the format's own convention for
/// an infinite source/sink species.
///
/// # Errors
/// Returns [`Error::Input`] if `amounts` names a species unknown to `crn`.
pub fn write_description(crn: &Crn, amounts: &HashMap<String, i64>) -> Result<String, Error> {
    for name in amounts.keys() {
        if crn.index_of(name).is_none() {
            return Err(Error::Input(format!(
                "'{name}' is not a species of this reaction network"
            )));
        }
    }

    let mut out = String::new();
    out.push_str("# Reactions\n\n");
    for (i, rxn) in crn.reactions().iter().enumerate() {
        let _ = writeln!(out, "R{i}:");
        let _ = writeln!(
            out,
            "{} > {}",
            fmt_expression(rxn.reactants()),
            fmt_expression(rxn.products())
        );
        let factors: Vec<String> = rxn
            .discrete_flux_terms()
            .into_iter()
            .map(|(s, offset)| {
                if offset == 0 {
                    s.to_string()
                } else {
                    format!("({s} - {offset})")
                }
            })
            .collect();
        let flux = if factors.is_empty() {
            "1".to_string()
        } else {
            factors.join("*")
        };
        let _ = writeln!(out, "k{i}*{flux}\n");
    }
    out.push('\n');

    out.push_str("# Rate constants\n");
    for (i, rxn) in crn.reactions().iter().enumerate() {
        let _ = writeln!(out, "k{i} = {}", rxn.k());
    }

    out.push_str("\n# Initial Species Counts\n");
    for s in crn.species() {
        let count = amounts.get(s.name()).copied().unwrap_or(0);
        let _ = writeln!(out, "{} = {count}", s.name());
    }

    Ok(out)
}

fn fmt_expression(expr: &Expression) -> String {
    let parts: Vec<String> = expr
        .iter()
        .map(|(s, c)| {
            let name = if s.is_nothing() {
                "$pool".to_string()
            } else {
                s.name().to_string()
            };
            if c == 1 {
                name
            } else {
                format!("{{{c}}}{name}")
            }
        })
        .collect();
    parts.join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    #[test]
    fn nothing_renders_as_pool_token() {
        let a = Species::new("A").unwrap();
        let nothing = Species::nothing();
        let crn = Crn::new(vec![(a >> nothing).with_k(0.5)]).unwrap();
        let out = write_description(&crn, &HashMap::new()).unwrap();
        assert!(out.contains("$pool"));
        assert!(!out.contains(NOTHING));
    }

    #[test]
    fn rejects_unknown_species_in_amounts() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![a >> b]).unwrap();
        let mut amounts = HashMap::new();
        amounts.insert("Z".to_string(), 1);
        assert!(write_description(&crn, &amounts).is_err());
    }

    #[test]
    fn renders_rate_constants_block() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![(a >> b).with_k(2.5)]).unwrap();
        let out = write_description(&crn, &HashMap::new()).unwrap();
        assert!(out.contains("k0 = 2.5"));
    }

    #[test]
    fn coefficient_two_reactant_renders_falling_factorial() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![(a.clone() * 2 + b.clone()) >> (a * 3)]).unwrap();
        let out = write_description(&crn, &HashMap::new()).unwrap();
        assert!(out.contains("A*(A - 1)*B"));
        assert!(!out.contains("A^2"));
    }
}
