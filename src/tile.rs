//! 2D tile self-assembly. §4.G.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::Error;
use crate::result::{TileGrid, TileResult};

/// The four lattice directions a tile can bond in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// A tile type: a name and an edge label (or `None` for a non-bonding
/// edge) in each of the four directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    name: String,
    edges: HashMap<Direction, Option<String>>,
}

impl Tile {
    /// Builds a tile named `name` with the given edge labels. `None` marks
    /// a non-bonding edge (never matches, regardless of the neighbor).
    pub fn new(
        name: impl Into<String>,
        north: Option<String>,
        south: Option<String>,
        east: Option<String>,
        west: Option<String>,
    ) -> Self {
        let mut edges = HashMap::new();
        edges.insert(Direction::North, north);
        edges.insert(Direction::South, south);
        edges.insert(Direction::East, east);
        edges.insert(Direction::West, west);
        Tile {
            name: name.into(),
            edges,
        }
    }

    /// This tile's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn edge(&self, dir: Direction) -> Option<&str> {
        self.edges.get(&dir).and_then(|e| e.as_deref())
    }

    /// True if this tile's edge toward `dir` bonds with `neighbor`'s edge
    /// toward the opposite direction: both labels must be present and
    /// equal.
    fn matches(&self, dir: Direction, neighbor: &Tile) -> bool {
        match (self.edge(dir), neighbor.edge(dir.opposite())) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// One occupied position in a [`TileGrid`].
#[derive(Debug, Clone)]
pub struct TilePlacement {
    pub x: i64,
    pub y: i64,
    pub tile: Tile,
}

/// A tile self-assembly system: a palette of tile types, bond strengths
/// per edge label, and a minimum total bond strength for a placement.
pub struct TileSystem {
    tiles: Vec<Tile>,
    bonds: HashMap<String, f64>,
    threshold: f64,
}

impl TileSystem {
    /// Builds a tile system from its palette, per-label bond strengths,
    /// and fit threshold (§4.G).
    pub fn new(
        tiles: impl IntoIterator<Item = Tile>,
        bonds: HashMap<String, f64>,
        threshold: f64,
    ) -> Self {
        TileSystem {
            tiles: tiles.into_iter().collect(),
            bonds,
            threshold,
        }
    }

    /// The fit test for `tile` at empty position `(x, y)` given `state`:
    /// every occupied neighbor's facing edge must equal `tile`'s edge
    /// toward it (both non-null), and the sum of the matching edges' bond
    /// strengths must meet `threshold`.
    fn fits(&self, tile: &Tile, state: &HashMap<(i64, i64), Tile>, x: i64, y: i64) -> bool {
        let mut bond_total = 0.0;
        for dir in Direction::all() {
            let (dx, dy) = dir.offset();
            let Some(neighbor) = state.get(&(x + dx, y + dy)) else {
                continue;
            };
            if !tile.matches(dir, neighbor) {
                return false;
            }
            let label = tile.edge(dir).expect("matches() only true for Some edges");
            bond_total += self.bonds.get(label).copied().unwrap_or(0.0);
        }
        bond_total >= self.threshold
    }

    /// Runs the self-assembly simulation from `seed` for up to `steps`
    /// placements, drawing randomness from `rng`. Per §4.G: at each step,
    /// a tile is chosen with probability proportional to how many frontier
    /// positions it fits at, then a position is chosen uniformly among
    /// that tile's fitting positions. Terminates early, with
    /// `terminated_early = true`, if no tile fits anywhere.
    ///
    /// # Errors
    /// Returns [`Error::Input`] if `seed` is empty.
    pub fn simulate(
        &self,
        seed: HashMap<(i64, i64), Tile>,
        steps: usize,
        rng: &mut StdRng,
    ) -> Result<TileResult, Error> {
        if seed.is_empty() {
            return Err(Error::Input(
                "tile self-assembly requires at least one seed placement".into(),
            ));
        }

        let mut state = seed;
        let mut frontier: HashSet<(i64, i64)> = HashSet::new();
        for &(x, y) in state.keys() {
            for dir in Direction::all() {
                let (dx, dy) = dir.offset();
                let pos = (x + dx, y + dy);
                if !state.contains_key(&pos) {
                    frontier.insert(pos);
                }
            }
        }

        let mut history = vec![TileGrid::new(placements_of(&state))];
        let mut terminated_early = false;

        for _ in 0..steps {
            let mut fits_by_tile: Vec<(&Tile, Vec<(i64, i64)>)> = Vec::new();
            for tile in &self.tiles {
                let positions: Vec<(i64, i64)> = frontier
                    .iter()
                    .copied()
                    .filter(|&(x, y)| self.fits(tile, &state, x, y))
                    .collect();
                if !positions.is_empty() {
                    fits_by_tile.push((tile, positions));
                }
            }

            if fits_by_tile.is_empty() {
                terminated_early = true;
                break;
            }

            let weights: Vec<f64> = fits_by_tile.iter().map(|(_, ps)| ps.len() as f64).collect();
            let total: f64 = weights.iter().sum();
            let mut pick = rng.gen_range(0.0..total);
            let mut chosen = 0;
            for (i, &w) in weights.iter().enumerate() {
                if pick < w {
                    chosen = i;
                    break;
                }
                pick -= w;
            }

            let (tile, positions) = &fits_by_tile[chosen];
            let idx = rng.gen_range(0..positions.len());
            let (x, y) = positions[idx];

            for dir in Direction::all() {
                let (dx, dy) = dir.offset();
                let neighbor = (x + dx, y + dy);
                if !state.contains_key(&neighbor) {
                    frontier.insert(neighbor);
                }
            }
            frontier.remove(&(x, y));
            state.insert((x, y), (*tile).clone());
            history.push(TileGrid::new(placements_of(&state)));
        }

        Ok(TileResult::new(history, terminated_early))
    }
}

fn placements_of(state: &HashMap<(i64, i64), Tile>) -> Vec<TilePlacement> {
    let mut placements: Vec<TilePlacement> = state
        .iter()
        .map(|(&(x, y), tile)| TilePlacement {
            x,
            y,
            tile: tile.clone(),
        })
        .collect();
    placements.sort_by_key(|p| (p.y, p.x));
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn double_sided(name: &str, w: &str, e: &str) -> Tile {
        Tile::new(name, None, None, Some(e.to_string()), Some(w.to_string()))
    }

    #[test]
    fn fit_test_requires_matching_non_null_edges() {
        let mut bonds = HashMap::new();
        bonds.insert("a".to_string(), 1.0);
        let system = TileSystem::new(vec![], bonds, 1.0);

        let seed_tile = double_sided("seed", "x", "a");
        let candidate = double_sided("cand", "a", "y");

        let mut state = HashMap::new();
        state.insert((0, 0), seed_tile);
        assert!(system.fits(&candidate, &state, 1, 0));

        let mismatched = double_sided("bad", "z", "y");
        assert!(!system.fits(&mismatched, &state, 1, 0));
    }

    #[test]
    fn empty_seed_is_an_error() {
        let system = TileSystem::new(vec![], HashMap::new(), 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(system.simulate(HashMap::new(), 5, &mut rng).is_err());
    }

    #[test]
    fn terminates_early_when_nothing_fits() {
        let seed_tile = double_sided("seed", "x", "x");
        let mut bonds = HashMap::new();
        bonds.insert("x".to_string(), 1.0);
        let system = TileSystem::new(vec![], bonds, 1.0);

        let mut seed = HashMap::new();
        seed.insert((0, 0), seed_tile);
        let mut rng = StdRng::seed_from_u64(7);
        let result = system.simulate(seed, 3, &mut rng).unwrap();
        assert!(result.terminated_early);
        assert_eq!(result.history().len(), 1);
    }

    #[test]
    fn deterministic_growth_with_one_fitting_tile() {
        let seed_tile = double_sided("seed", "x", "a");
        let grower = double_sided("grower", "a", "x");

        let mut bonds = HashMap::new();
        bonds.insert("a".to_string(), 1.0);
        bonds.insert("x".to_string(), 1.0);
        let system = TileSystem::new(vec![grower], bonds, 1.0);

        let mut seed = HashMap::new();
        seed.insert((0, 0), seed_tile);
        let mut rng = StdRng::seed_from_u64(3);
        let result = system.simulate(seed, 2, &mut rng).unwrap();
        assert!(!result.terminated_early);
        assert_eq!(result.history().len(), 3);
        assert!(result.final_grid().at(1, 0).is_some());
    }
}
