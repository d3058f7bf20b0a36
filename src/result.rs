//! Simulation result containers: the output of [`crate::det::simulate`],
//! [`crate::sto::simulate`], and [`crate::tile::simulate`]. §4.H.

use std::collections::HashMap;

use crate::crn::Crn;
use crate::error::Error;
use crate::reaction::Reaction;
use crate::species::{Species, NOTHING};
use crate::tile::{Tile, TilePlacement};

/// The result of a deterministic simulation: a time grid and, for each
/// species, its concentration at each grid point. `nothing` is present as
/// a constant series of ones (§4.E) so that downstream consumers can index
/// it uniformly; callers that don't want it should filter it out
/// themselves, same as the collaborator this crate's rate-law substitution
/// assumes.
#[derive(Debug, Clone)]
pub struct DetResult {
    times: Vec<f64>,
    series: HashMap<String, Vec<f64>>,
}

impl DetResult {
    pub(crate) fn new(crn: &Crn, times: Vec<f64>, series: Vec<Vec<f64>>) -> Self {
        let mut map: HashMap<String, Vec<f64>> = crn
            .species()
            .iter()
            .zip(series)
            .map(|(s, values)| (s.name().to_string(), values))
            .collect();
        map.insert(NOTHING.to_string(), vec![1.0; times.len()]);
        DetResult { times, series: map }
    }

    /// The sampled time grid.
    pub fn time(&self) -> &[f64] {
        &self.times
    }

    /// The concentration series for the species named `name`, or `None` if
    /// `name` isn't present in this result.
    pub fn species(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Looks up a series by [`Species`] or the reserved names `"time"`.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] if `key` is a schema species with unbound
    /// groups (§4.H): only concrete species and fully-bound schema species
    /// can appear in a concentration series.
    pub fn get(&self, key: &Species) -> Result<Option<&[f64]>, Error> {
        if key.has_free_groups() {
            return Err(Error::Schema(format!(
                "cannot index a simulation result by schema species '{}' with free groups",
                key.name()
            )));
        }
        Ok(self.species(key.name()))
    }
}

/// The result of a stochastic (Gillespie direct-method) simulation: a time
/// sequence, molecule-count sequences per species, whether the run ended
/// because no reaction remained applicable, and (for schema runs) the
/// ordered list of concretely-fired reactions. Unlike [`DetResult`],
/// `nothing` never appears: it has no meaningful discrete count and the
/// schema-based original this crate's stochastic engine is grounded on
/// hides it from stochastic output.
#[derive(Debug, Clone)]
pub struct StoResult {
    times: Vec<f64>,
    series: HashMap<String, Vec<i64>>,
    fired: Vec<Reaction>,
    /// True if the run ended because no reaction's propensity was
    /// positive (§4.F step 3), rather than hitting `T` or `N`. This is
    /// data describing how the run ended, not an error: reaching a steady
    /// state is a valid, often expected, outcome.
    pub exhausted: bool,
}

impl StoResult {
    pub(crate) fn new(
        times: Vec<f64>,
        series: HashMap<String, Vec<i64>>,
        fired: Vec<Reaction>,
        exhausted: bool,
    ) -> Self {
        StoResult {
            times,
            series,
            fired,
            exhausted,
        }
    }

    /// The sampled time sequence, one entry per accepted event (plus the
    /// initial sample at `t=0`).
    pub fn time(&self) -> &[f64] {
        &self.times
    }

    /// The molecule-count sequence for the species named `name`, or `None`
    /// if `name` was never present during the run.
    pub fn species(&self, name: &str) -> Option<&[i64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// The reactions fired, in firing order. Only meaningful for schema
    /// runs (§4.F); for a fixed, non-schema reaction set this is just the
    /// same handful of `Reaction`s repeated.
    pub fn reactions(&self) -> &[Reaction] {
        &self.fired
    }

    /// Looks up a series by [`Species`].
    ///
    /// # Errors
    /// Returns [`Error::Schema`] if `key` is a schema species with unbound
    /// groups, or [`Error::Input`] if `key` is the reserved `nothing`
    /// species (never tracked in stochastic output).
    pub fn get(&self, key: &Species) -> Result<Option<&[i64]>, Error> {
        if key.has_free_groups() {
            return Err(Error::Schema(format!(
                "cannot index a simulation result by schema species '{}' with free groups",
                key.name()
            )));
        }
        if key.is_nothing() {
            return Err(Error::Input(
                "'nothing' has no molecule count in a stochastic result".into(),
            ));
        }
        Ok(self.species(key.name()))
    }
}

/// One frame of a tile self-assembly run: the grid positions occupied so
/// far, in placement order starting from the seed. §4.G.
#[derive(Debug, Clone)]
pub struct TileGrid {
    placements: Vec<TilePlacement>,
}

impl TileGrid {
    pub(crate) fn new(placements: Vec<TilePlacement>) -> Self {
        TileGrid { placements }
    }

    /// The tile occupying `(x, y)`, if any.
    pub fn at(&self, x: i64, y: i64) -> Option<&Tile> {
        self.placements
            .iter()
            .find(|p| p.x == x && p.y == y)
            .map(|p| &p.tile)
    }

    /// All occupied positions and their tiles, in placement order.
    pub fn placements(&self) -> &[TilePlacement] {
        &self.placements
    }
}

/// The result of a tile self-assembly run: the per-step sequence of grids,
/// starting with the seed (§4.G). `terminated_early` is true if no tile
/// fit anywhere before the requested step count was reached.
#[derive(Debug, Clone)]
pub struct TileResult {
    history: Vec<TileGrid>,
    /// True if the run stopped before `steps` placements because no tile
    /// fit any frontier position. Not an error: a saturated assembly is a
    /// valid terminal state.
    pub terminated_early: bool,
}

impl TileResult {
    pub(crate) fn new(history: Vec<TileGrid>, terminated_early: bool) -> Self {
        TileResult {
            history,
            terminated_early,
        }
    }

    /// The per-step sequence of grids, index 0 being the initial seed.
    pub fn history(&self) -> &[TileGrid] {
        &self.history
    }

    /// The final grid reached by this run.
    pub fn final_grid(&self) -> &TileGrid {
        self.history.last().expect("history always has a seed frame")
    }
}

/// The reserved key naming the fired-reaction list in a stochastic result.
pub const REACTIONS: &str = "reactions";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    #[test]
    fn det_result_exposes_nothing_as_constant_ones() {
        let a = Species::new("A").unwrap();
        let b = Species::new("B").unwrap();
        let crn = Crn::new(vec![a >> b]).unwrap();
        let result = DetResult::new(&crn, vec![0.0, 1.0], vec![vec![1.0, 0.5], vec![0.0, 0.5]]);
        assert_eq!(result.species(NOTHING), Some(&[1.0, 1.0][..]));
        assert_eq!(result.time(), &[0.0, 1.0]);
    }

    #[test]
    fn sto_result_rejects_nothing_lookup() {
        let result = StoResult::new(vec![0.0], HashMap::new(), vec![], false);
        let err = result.get(&Species::nothing());
        assert!(matches!(err, Err(Error::Input(_))));
    }

    #[test]
    fn schema_species_with_free_groups_is_rejected() {
        let schema = Species::schema("X{g}", []).unwrap();
        let a = Species::new("A").unwrap();
        let crn = Crn::new(vec![a.clone() >> a]).unwrap();
        let result = DetResult::new(&crn, vec![0.0], vec![vec![1.0]]);
        assert!(matches!(result.get(&schema), Err(Error::Schema(_))));
    }
}
