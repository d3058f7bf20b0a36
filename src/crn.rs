//! The `Crn` container: a fixed set of reactions, the species index derived
//! from them, and a compiled rate law for the deterministic simulator. §4.D.

use std::collections::HashMap;

use crate::error::Error;
use crate::reaction::Reaction;
use crate::species::Species;

/// A chemical reaction network: an immutable list of reactions plus the
/// species index and rate-law evaluator derived from them.
///
/// Construction is the one place index assignment happens; `Crn` never
/// mutates its species set afterward (schema expansion happens per-step in
/// [`crate::sto`] against a separately tracked live state, not here).
pub struct Crn {
    reactions: Vec<Reaction>,
    /// species (full equality, not just name) -> index. Two schema species
    /// that share a template name but differ in their group-regex map are
    /// distinct keys here, never colliding (§3: "two schemas that match
    /// identical language but differ syntactically are treated as
    /// distinct").
    by_species: HashMap<Species, usize>,
    species_by_index: Vec<Species>,
}

impl Crn {
    /// Builds a `Crn` from a list of reactions: computes the species set,
    /// sorts it to assign indices (§4.D). `nothing` is never assigned an
    /// index here: it is a constant (substituted to `1` in flux terms,
    /// §4.D) rather than a state variable, and is reintroduced as a
    /// constant-one series only in the deterministic simulator's result,
    /// per §4.E.
    pub fn new(reactions: impl IntoIterator<Item = Reaction>) -> Result<Self, Error> {
        let reactions: Vec<Reaction> = reactions.into_iter().collect();

        let mut species: Vec<Species> = reactions
            .iter()
            .flat_map(|r| r.get_species())
            .filter(|s| !s.is_nothing())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        species.sort();

        let by_species: HashMap<Species, usize> = species
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();

        Ok(Crn {
            reactions,
            by_species,
            species_by_index: species,
        })
    }

    /// The reactions that make up this network, in the order given at
    /// construction (and the order `reactions_index` enumerates them in,
    /// e.g. for [`crate::bridge::write_description`]).
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// The species present in this network, sorted in index order.
    pub fn species(&self) -> &[Species] {
        &self.species_by_index
    }

    /// The index assigned to the first species named `name`. Two species
    /// can share a name only if both are schema species with distinct group
    /// maps (§3); for that case, use [`Crn::index_of_species`] to disambiguate
    /// by the full species value instead of the bare name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species_by_index.iter().position(|s| s.name() == name)
    }

    /// The index assigned to the exact species `s`, disambiguating
    /// same-named schema species with different group maps (unlike
    /// [`Crn::index_of`], which can only match by name).
    pub fn index_of_species(&self, s: &Species) -> Option<usize> {
        self.by_species.get(s).copied()
    }

    /// The species name assigned to `index`, if any.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.species_by_index.get(index).map(Species::name)
    }

    /// Number of distinct species in this network.
    pub fn len(&self) -> usize {
        self.species_by_index.len()
    }

    /// True if this network has no species (and hence no reactions that
    /// reference any).
    pub fn is_empty(&self) -> bool {
        self.species_by_index.is_empty()
    }

    /// Compiles the rate law: an evaluator `f(v) -> dv/dt`, `v` and the
    /// result indexed per [`Crn::index_of`]. Per §4.D, for each species `s`
    /// at index `i`, the law is `Σ_r net_production(s, r) * flux(r)`, with
    /// `flux(r) = k_r * Π_{x in reactants(r), x != nothing} v[index_of(x)]
    /// ^ coeff(x, r)`.
    ///
    /// The returned closure is pure and allocation-light on the hot path:
    /// it allocates its output buffer once per call (required by its
    /// signature) but the per-reaction flux terms are borrowed from `self`,
    /// not recomputed from scratch.
    pub fn rate_law(&self) -> impl Fn(&[f64]) -> Vec<f64> + '_ {
        move |v: &[f64]| {
            let mut dv = vec![0.0; self.species_by_index.len()];
            for rxn in &self.reactions {
                let (k, factors) = rxn.flux_terms();
                let mut flux = k;
                for (s, exp) in &factors {
                    let idx = self
                        .index_of(s.name())
                        .expect("reaction species must be indexed by its own Crn");
                    flux *= v[idx].powi(*exp);
                }
                for (i, s) in self.species_by_index.iter().enumerate() {
                    let net = rxn.net_production(s);
                    if net != 0 {
                        dv[i] += net as f64 * flux;
                    }
                }
            }
            dv
        }
    }

    /// Builds an index-ordered vector from a `name -> value` mapping,
    /// defaulting missing species to `default`. Used by both simulators to
    /// turn a caller-supplied initial-state map into `v0`/`S_0`.
    ///
    /// # Errors
    /// Returns [`Error::Input`] if `initial` contains a key that isn't one
    /// of this network's species.
    pub fn index_vector<T: Copy>(
        &self,
        initial: &HashMap<String, T>,
        default: T,
    ) -> Result<Vec<T>, Error> {
        for key in initial.keys() {
            if self.index_of(key).is_none() {
                return Err(Error::Input(format!(
                    "'{key}' is not a species of this reaction network"
                )));
            }
        }
        Ok(self
            .species_by_index
            .iter()
            .map(|s| initial.get(s.name()).copied().unwrap_or(default))
            .collect())
    }
}
