//! Remaining-cost estimates for the sliding-tile puzzle.
//!
//! Every heuristic is evaluated on the posterior state of a move, i.e. the state the
//! move produces, and estimates how far that state is from the goal. Four variants
//! are provided and can be combined with any cost strategy from [`crate::costs`]:
//!
//! - [`MisplacedTiles`]: counts cells that differ from the goal.
//! - [`ManhattanDistance`]: sums `|dx| + |dy|` of every displaced tile. Admissible.
//! - [`EuclideanSquaredDistance`]: sums `dx² + dy²`. Not admissible; searches more aggressively.
//! - [`CombinedMisplacementDistance`]: misplacement count first, squared distance as tie-breaker.
use crate::engine::{CoordinateTracker, Goal, Move, State, Tile, EMPTY_TILE};
use crate::error::SearchError;
use std::fmt;

/// Estimates the remaining cost from a posterior state to the goal.
pub trait Heuristic {
    /// Fails with [`SearchError::InvalidArgument`] for an empty state and with
    /// [`SearchError::SizeMismatch`] if `posterior` is not as long as the goal.
    fn estimate(&self, posterior: &State, mv: Move) -> Result<f64, SearchError>;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn estimate(&self, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        (**self).estimate(posterior, mv)
    }
}

/// Number of cells whose value differs from the goal's value at that cell.
///
/// The empty marker is counted like any other tile. Its contribution vanishes once
/// the goal is reached, so it never steers the search away from the goal.
///
/// # Examples
/// ```
/// use sliding_puzzle_solver::engine::{Dimensions, Goal, Move, State};
/// use sliding_puzzle_solver::heuristics::{Heuristic, MisplacedTiles};
///
/// let goal = Goal::canonical(Dimensions::new(3, 3).unwrap());
/// let heuristic = MisplacedTiles::new(goal);
/// let state = State::new(vec![1, 0, 2, 3, 4, 5, 6, 7, 8]);
/// assert_eq!(heuristic.estimate(&state, Move::new(0, 1)).unwrap(), 2.0);
/// ```
#[derive(Clone, Debug)]
pub struct MisplacedTiles {
    goal: Goal,
}

impl MisplacedTiles {
    pub fn new(goal: Goal) -> Self {
        MisplacedTiles { goal }
    }
}

impl Heuristic for MisplacedTiles {
    fn estimate(&self, posterior: &State, _mv: Move) -> Result<f64, SearchError> {
        self.goal.check_size(posterior)?;
        let mismatching = self
            .goal
            .tiles()
            .iter()
            .zip(posterior.tiles())
            .filter(|(expected, actual)| expected != actual)
            .count();
        Ok(mismatching as f64)
    }
}

/// Sum of the Manhattan distances of every displaced, non-empty tile to its goal cell.
#[derive(Clone, Debug)]
pub struct ManhattanDistance {
    goal: Goal,
}

impl ManhattanDistance {
    pub fn new(goal: Goal) -> Self {
        ManhattanDistance { goal }
    }
}

impl Heuristic for ManhattanDistance {
    fn estimate(&self, posterior: &State, _mv: Move) -> Result<f64, SearchError> {
        self.goal.check_size(posterior)?;
        Ok(sum_of_distances(&self.goal, posterior, |dx, dy| {
            (dx + dy) as f64
        }))
    }
}

/// Sum of the squared Euclidean distances of every displaced, non-empty tile.
///
/// The square root is never taken: ordering by `a` and by `√a` agree for
/// non-negative values. Without the root the estimate can exceed the true number of
/// moves, so this heuristic is not admissible and A* loses its optimality guarantee.
#[derive(Clone, Debug)]
pub struct EuclideanSquaredDistance {
    goal: Goal,
}

impl EuclideanSquaredDistance {
    pub fn new(goal: Goal) -> Self {
        EuclideanSquaredDistance { goal }
    }
}

impl Heuristic for EuclideanSquaredDistance {
    fn estimate(&self, posterior: &State, _mv: Move) -> Result<f64, SearchError> {
        self.goal.check_size(posterior)?;
        Ok(sum_of_distances(&self.goal, posterior, |dx, dy| {
            (dx * dx + dy * dy) as f64
        }))
    }
}

/// Misplacement count scaled by a power of ten, plus the squared distance.
///
/// The base factor is the smallest power of ten above the largest squared-distance
/// sum a grid can produce, so the misplacement count always dominates and the
/// distance only orders states with equal misplacement.
#[derive(Clone, Debug)]
pub struct CombinedMisplacementDistance {
    misplacement: MisplacedTiles,
    distance: EuclideanSquaredDistance,
    base_factor: f64,
}

impl CombinedMisplacementDistance {
    pub fn new(goal: Goal) -> Self {
        let (width, height) = (goal.width() as u64, goal.height() as u64);
        let largest_distance = width * width + height * height;
        let largest_sum = largest_distance * (width * height);

        let mut base_factor: u64 = 1;
        while base_factor <= largest_sum {
            base_factor *= 10;
        }

        CombinedMisplacementDistance {
            misplacement: MisplacedTiles::new(goal.clone()),
            distance: EuclideanSquaredDistance::new(goal),
            base_factor: base_factor as f64,
        }
    }

    pub fn base_factor(&self) -> f64 {
        self.base_factor
    }
}

impl Heuristic for CombinedMisplacementDistance {
    fn estimate(&self, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        let misplacement = self.misplacement.estimate(posterior, mv)?;
        let distance = self.distance.estimate(posterior, mv)?;
        Ok(misplacement * self.base_factor + distance)
    }
}

/// Sums `distance(|dx|, |dy|)` over every tile that is neither in place nor empty.
///
/// Each displaced tile's goal cell is found by a linear scan of the goal; both
/// scans only move forward, so coordinates are tracked incrementally.
fn sum_of_distances(goal: &Goal, posterior: &State, distance: impl Fn(usize, usize) -> f64) -> f64 {
    let goal_tiles = goal.tiles();
    let mut tile_coords = CoordinateTracker::new(goal.width());
    let mut goal_coords = CoordinateTracker::new(goal.width());

    let mut sum = 0.0;
    for (index, &tile) in posterior.tiles().iter().enumerate() {
        tile_coords.seek(index);
        if tile == goal_tiles[index] || tile == EMPTY_TILE {
            continue;
        }

        locate(goal_tiles, tile, &mut goal_coords);
        let dx = tile_coords.x().abs_diff(goal_coords.x());
        let dy = tile_coords.y().abs_diff(goal_coords.y());
        sum += distance(dx, dy);
    }
    sum
}

fn locate(goal_tiles: &[Tile], tile: Tile, coords: &mut CoordinateTracker) {
    coords.reset();
    for (target, &expected) in goal_tiles.iter().enumerate() {
        coords.seek(target);
        if expected == tile {
            break;
        }
    }
}

/// Selects one of the heuristic variants by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum HeuristicKind {
    /// Count of cells differing from the goal
    MisplacedTiles,
    /// Sum of Manhattan distances (admissible)
    Manhattan,
    /// Sum of squared Euclidean distances (not admissible)
    EuclideanSquared,
    /// Misplacement count with squared distance as tie-breaker
    Combined,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 4] = [
        HeuristicKind::MisplacedTiles,
        HeuristicKind::Manhattan,
        HeuristicKind::EuclideanSquared,
        HeuristicKind::Combined,
    ];

    pub fn build(self, goal: &Goal) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::MisplacedTiles => Box::new(MisplacedTiles::new(goal.clone())),
            HeuristicKind::Manhattan => Box::new(ManhattanDistance::new(goal.clone())),
            HeuristicKind::EuclideanSquared => {
                Box::new(EuclideanSquaredDistance::new(goal.clone()))
            }
            HeuristicKind::Combined => Box::new(CombinedMisplacementDistance::new(goal.clone())),
        }
    }

    /// Whether the estimate never exceeds the true number of remaining moves.
    ///
    /// Misplaced-tile counting includes the empty marker and so can overestimate by one.
    pub fn is_admissible(self) -> bool {
        matches!(self, HeuristicKind::Manhattan)
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeuristicKind::MisplacedTiles => "misplaced-tiles",
            HeuristicKind::Manhattan => "manhattan",
            HeuristicKind::EuclideanSquared => "euclidean-squared",
            HeuristicKind::Combined => "combined",
        };
        f.write_str(name)
    }
}
