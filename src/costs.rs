//! Edge weights and the cost strategies that select the search flavour.
//!
//! A [`Weight`] prices a single move in isolation. A [`CostStrategy`] combines a
//! weight and/or a [`Heuristic`] into the value the fringe is ordered by:
//!
//! | Strategy            | Cost                 |
//! |---------------------|----------------------|
//! | [`BestFirst`]       | weight               |
//! | [`GreedyBestFirst`] | heuristic            |
//! | [`AStar`]           | weight + heuristic   |
use crate::engine::{Goal, Move, State};
use crate::error::SearchError;
use crate::heuristics::{Heuristic, ManhattanDistance};
use std::fmt;

/// Cost of traversing exactly one edge of the search tree.
pub trait Weight {
    fn weight(&self, posterior: &State, mv: Move) -> Result<f64, SearchError>;
}

impl<W: Weight + ?Sized> Weight for Box<W> {
    fn weight(&self, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        (**self).weight(posterior, mv)
    }
}

/// Every real move costs 1; a degenerate move costs 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitWeight;

impl Weight for UnitWeight {
    fn weight(&self, _posterior: &State, mv: Move) -> Result<f64, SearchError> {
        if mv.is_degenerate() {
            return Ok(0.0);
        }
        Ok(1.0)
    }
}

/// Prices a move by the Manhattan distance of the state it produces.
///
/// This reuses the heuristic's own measure as the edge cost, so combining it with A*
/// degenerates into a greedy search. Kept for experimentation.
#[derive(Clone, Debug)]
pub struct DistanceWeight {
    goal: Goal,
    distance: ManhattanDistance,
}

impl DistanceWeight {
    pub fn new(goal: Goal) -> Self {
        DistanceWeight {
            distance: ManhattanDistance::new(goal.clone()),
            goal,
        }
    }
}

impl Weight for DistanceWeight {
    fn weight(&self, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        self.goal.check_size(posterior)?;
        if mv.is_degenerate() {
            return Ok(0.0);
        }
        self.distance.estimate(posterior, mv)
    }
}

/// Selects one of the weight variants by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum WeightKind {
    /// Every move costs 1
    #[default]
    Unit,
    /// Manhattan distance of the resulting state
    Distance,
}

impl WeightKind {
    pub fn build(self, goal: &Goal) -> Box<dyn Weight> {
        match self {
            WeightKind::Unit => Box::new(UnitWeight),
            WeightKind::Distance => Box::new(DistanceWeight::new(goal.clone())),
        }
    }
}

/// Cost of moving from `prior` to `posterior` via `mv`, as seen by one search flavour.
///
/// The engine adds this to the parent's cumulative cost.
pub trait CostStrategy {
    fn cost(&self, prior: &State, posterior: &State, mv: Move) -> Result<f64, SearchError>;
}

impl<C: CostStrategy + ?Sized> CostStrategy for Box<C> {
    fn cost(&self, prior: &State, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        (**self).cost(prior, posterior, mv)
    }
}

fn check_states(prior: &State, posterior: &State) -> Result<(), SearchError> {
    if prior.is_empty() {
        return Err(SearchError::invalid("prior state must not be empty"));
    }
    if posterior.is_empty() {
        return Err(SearchError::invalid("posterior state must not be empty"));
    }
    Ok(())
}

/// Orders purely by accumulated path weight.
#[derive(Clone, Debug)]
pub struct BestFirst<W> {
    weight: W,
}

impl<W: Weight> BestFirst<W> {
    pub fn new(weight: W) -> Self {
        BestFirst { weight }
    }
}

impl<W: Weight> CostStrategy for BestFirst<W> {
    fn cost(&self, prior: &State, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        check_states(prior, posterior)?;
        self.weight.weight(posterior, mv)
    }
}

/// Orders purely by the estimated remaining cost.
#[derive(Clone, Debug)]
pub struct GreedyBestFirst<H> {
    heuristic: H,
}

impl<H: Heuristic> GreedyBestFirst<H> {
    pub fn new(heuristic: H) -> Self {
        GreedyBestFirst { heuristic }
    }
}

impl<H: Heuristic> CostStrategy for GreedyBestFirst<H> {
    fn cost(&self, prior: &State, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        check_states(prior, posterior)?;
        self.heuristic.estimate(posterior, mv)
    }
}

/// Orders by path weight plus estimated remaining cost.
#[derive(Clone, Debug)]
pub struct AStar<W, H> {
    weight: W,
    heuristic: H,
}

impl<W: Weight, H: Heuristic> AStar<W, H> {
    pub fn new(weight: W, heuristic: H) -> Self {
        AStar { weight, heuristic }
    }
}

impl<W: Weight, H: Heuristic> CostStrategy for AStar<W, H> {
    fn cost(&self, prior: &State, posterior: &State, mv: Move) -> Result<f64, SearchError> {
        check_states(prior, posterior)?;
        let weight = self.weight.weight(posterior, mv)?;
        let heuristic = self.heuristic.estimate(posterior, mv)?;
        Ok(weight + heuristic)
    }
}

/// Selects the search flavour, i.e. which cost strategy orders the fringe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    /// Weight only
    BestFirst,
    /// Heuristic only
    GreedyBestFirst,
    /// Weight plus heuristic
    #[default]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::BestFirst,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
    ];

    pub fn uses_weight(self) -> bool {
        !matches!(self, Algorithm::GreedyBestFirst)
    }

    pub fn uses_heuristic(self) -> bool {
        !matches!(self, Algorithm::BestFirst)
    }

    /// Composes the cost strategy for this flavour.
    ///
    /// Fails with [`SearchError::InvalidArgument`] if a strategy object the flavour
    /// needs is missing. Unneeded ones are ignored.
    ///
    /// # Examples
    /// ```
    /// use sliding_puzzle_solver::costs::{Algorithm, UnitWeight, Weight};
    ///
    /// let weight: Box<dyn Weight> = Box::new(UnitWeight);
    /// assert!(Algorithm::BestFirst.build(Some(weight), None).is_ok());
    /// assert!(Algorithm::AStar.build(None, None).is_err());
    /// ```
    pub fn build(
        self,
        weight: Option<Box<dyn Weight>>,
        heuristic: Option<Box<dyn Heuristic>>,
    ) -> Result<Box<dyn CostStrategy>, SearchError> {
        let missing_weight = || SearchError::invalid(format!("{} requires a weight strategy", self));
        let missing_heuristic =
            || SearchError::invalid(format!("{} requires a heuristic strategy", self));

        let strategy: Box<dyn CostStrategy> = match self {
            Algorithm::BestFirst => Box::new(BestFirst::new(weight.ok_or_else(missing_weight)?)),
            Algorithm::GreedyBestFirst => Box::new(GreedyBestFirst::new(
                heuristic.ok_or_else(missing_heuristic)?,
            )),
            Algorithm::AStar => Box::new(AStar::new(
                weight.ok_or_else(missing_weight)?,
                heuristic.ok_or_else(missing_heuristic)?,
            )),
        };
        Ok(strategy)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::BestFirst => "best-first",
            Algorithm::GreedyBestFirst => "greedy-best-first",
            Algorithm::AStar => "a-star",
        };
        f.write_str(name)
    }
}
