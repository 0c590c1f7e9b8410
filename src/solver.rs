//! Best-first tree search over puzzle states.
//!
//! The engine keeps two containers:
//! - a [`Fringe`] of not-yet-expanded actions, sorted by ascending cumulative cost;
//! - a [`VisitedHistory`], the append-only arena of every expanded action. Parents are
//!   plain indices into it, which is what makes path reconstruction possible.
//!
//! Each iteration removes one of the cheapest fringe entries, choosing uniformly at
//! random among entries that tie on cost, appends it to the history, tests it against
//! the goal and otherwise expands it. Successors whose state was already expanded are
//! dropped. The cost strategy decides whether this behaves as best-first, greedy
//! best-first or A* search.
use crate::costs::CostStrategy;
use crate::engine::{Action, Goal, Move, NodeId, State};
use crate::error::SearchError;
use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Index;

/// What to do when a successor reaches an already expanded state more cheaply than
/// the recorded expansion did. Either way the event is logged and counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum RegressionPolicy {
    /// Drop the cheaper successor like any other duplicate
    #[default]
    Discard,
    /// Put the cheaper successor on the fringe so its state is expanded again
    Reinsert,
}

/// Construction-time settings of a search run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Seed of the tie-break generator. `None` seeds from system entropy.
    pub seed: Option<u64>,
    pub regression_policy: RegressionPolicy,
    /// Also drop successors whose state is already waiting on the fringe.
    pub suppress_fringe_duplicates: bool,
}

/// A successor that reached an expanded state at a lower cost than its expansion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostRegression {
    pub visited_id: NodeId,
    pub visited_cost: f64,
    pub new_cost: f64,
}

/// Counters collected during a search run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStats {
    /// Fringe entries moved into the history, the root excluded.
    pub expanded: usize,
    /// Successor actions created.
    pub generated: usize,
    /// Successors and stale fringe entries dropped because their state was already expanded.
    pub duplicates_discarded: usize,
    /// Successors dropped because their state was already on the fringe.
    pub fringe_duplicates_discarded: usize,
    pub peak_fringe: usize,
    /// Number of generated actions per tree depth.
    pub nodes_per_depth: BTreeMap<usize, usize>,
    pub cost_regressions: Vec<CostRegression>,
}

/// Append-only arena of expanded actions, indexed by [`NodeId`].
#[derive(Clone, Debug, Default)]
pub struct VisitedHistory {
    actions: Vec<Action>,
}

impl VisitedHistory {
    pub fn new() -> Self {
        VisitedHistory::default()
    }

    /// Appends `action` and returns its id.
    pub fn push(&mut self, action: Action) -> NodeId {
        self.actions.push(action);
        self.actions.len() - 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Action> {
        self.actions.get(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter()
    }

    /// Id of the most recently appended action holding `state`.
    ///
    /// This is a linear scan from the newest entry backwards.
    pub fn find_state(&self, state: &State) -> Option<NodeId> {
        self.actions.iter().rposition(|a| a.state() == state)
    }

    /// The chain of actions from the root to `id`, root first.
    ///
    /// # Panics
    /// Panics if `id` or any parent id along the chain is not in the history.
    pub fn path_to(&self, id: NodeId) -> Vec<Action> {
        let mut stack = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let action = &self.actions[node];
            stack.push(action.clone());
            current = action.parent();
        }
        stack.reverse();
        stack
    }
}

impl Index<NodeId> for VisitedHistory {
    type Output = Action;

    fn index(&self, id: NodeId) -> &Action {
        &self.actions[id]
    }
}

/// Orders by cost, then parent id, then move, so equal costs keep a stable order.
fn compare_actions(a: &Action, b: &Action) -> Ordering {
    a.cost()
        .total_cmp(&b.cost())
        .then_with(|| a.parent().cmp(&b.parent()))
        .then_with(|| a.mv().cmp(&b.mv()))
}

/// Actions waiting to be expanded.
///
/// Callers push freely and call [`sort`](Self::sort) before the next [`take`](Self::take).
#[derive(Clone, Debug, Default)]
pub struct Fringe {
    actions: Vec<Action>,
}

impl Fringe {
    pub fn new() -> Self {
        Fringe::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter()
    }

    pub fn contains_state(&self, state: &State) -> bool {
        self.actions.iter().any(|a| a.state() == state)
    }

    /// Restores ascending cost order. The sort is stable.
    pub fn sort(&mut self) {
        self.actions.sort_by(compare_actions);
    }

    /// Length of the leading run of entries sharing the lowest cost.
    pub fn tie_run_len(&self) -> usize {
        match self.actions.first() {
            Some(first) => {
                let lowest = first.cost();
                self.actions
                    .iter()
                    .take_while(|a| a.cost() <= lowest)
                    .count()
            }
            None => 0,
        }
    }

    /// Removes one of the cheapest entries, picked uniformly at random among ties.
    ///
    /// Expects the fringe to be sorted.
    pub fn take<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Action> {
        let run = self.tie_run_len();
        if run == 0 {
            return None;
        }
        let selected = rng.gen_range(0..run);
        Some(self.actions.remove(selected))
    }
}

/// Lifecycle of a search run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The root is built but not yet tested or expanded.
    Initializing,
    Expanding,
    Succeeded,
    /// The fringe ran dry without reaching the goal.
    Exhausted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Exhausted)
    }
}

/// Builds the successor actions of the action stored at `parent_id`.
///
/// Each legal move produces a fresh posterior state; its cumulative cost is the
/// parent's cost plus what `cost` charges for the move.
pub fn successors<C: CostStrategy + ?Sized>(
    parent_id: NodeId,
    parent: &Action,
    width: usize,
    cost: &C,
) -> Result<Vec<Action>, SearchError> {
    let prior = parent.state();
    prior
        .legal_moves(width)
        .map(|mv| {
            let posterior = prior.apply(mv);
            let step = cost.cost(prior, &posterior, mv)?;
            Ok(Action::new(
                parent.cost() + step,
                parent_id,
                mv,
                posterior,
                parent.depth() + 1,
            ))
        })
        .collect()
}

/// A path from the initial state to the goal.
#[derive(Clone, Debug)]
pub struct Solution {
    path: Vec<Action>,
    stats: SearchStats,
}

impl Solution {
    /// Every action on the path, starting with the root.
    pub fn path(&self) -> &[Action] {
        &self.path
    }

    /// The moves in the order they are played.
    pub fn moves(&self) -> Vec<Move> {
        self.path.iter().filter_map(Action::mv).collect()
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cumulative cost recorded on the goal action.
    pub fn cost(&self) -> f64 {
        self.path.last().map_or(0.0, Action::cost)
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

/// Terminal result of a search run.
#[derive(Clone, Debug)]
pub enum Outcome {
    Solved(Solution),
    /// No solution is reachable from the initial state.
    Exhausted(SearchStats),
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            Outcome::Exhausted(_) => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            Outcome::Solved(solution) => solution.stats(),
            Outcome::Exhausted(stats) => stats,
        }
    }
}

/// One search run, advanced an expansion at a time with [`step`](Self::step).
///
/// Between steps the fringe, the history and the last expanded action can be
/// inspected, e.g. to render progress. Nothing outside the run mutates them.
pub struct Search<'a, C: ?Sized, R> {
    goal: &'a Goal,
    cost: &'a C,
    rng: R,
    regression_policy: RegressionPolicy,
    suppress_fringe_duplicates: bool,
    fringe: Fringe,
    history: VisitedHistory,
    phase: Phase,
    solution_id: Option<NodeId>,
    stats: SearchStats,
}

impl<'a, C: CostStrategy + ?Sized, R: Rng> Search<'a, C, R> {
    /// Prepares a run from `initial`, which must be a valid state as long as the goal.
    pub fn new(
        goal: &'a Goal,
        cost: &'a C,
        initial: State,
        rng: R,
        options: &SearchOptions,
    ) -> Result<Self, SearchError> {
        goal.check_size(&initial)?;
        initial.validate()?;

        let mut history = VisitedHistory::new();
        history.push(Action::root(initial));

        Ok(Search {
            goal,
            cost,
            rng,
            regression_policy: options.regression_policy,
            suppress_fringe_duplicates: options.suppress_fringe_duplicates,
            fringe: Fringe::new(),
            history,
            phase: Phase::Initializing,
            solution_id: None,
            stats: SearchStats::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fringe(&self) -> &Fringe {
        &self.fringe
    }

    pub fn history(&self) -> &VisitedHistory {
        &self.history
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The action appended to the history most recently.
    pub fn last_expanded(&self) -> Option<&Action> {
        self.history.last()
    }

    /// Advances the run by one transition and returns the new phase.
    ///
    /// Calling `step` on a finished run is a no-op.
    pub fn step(&mut self) -> Result<Phase, SearchError> {
        self.phase = match self.phase {
            Phase::Initializing => self.initialize()?,
            Phase::Expanding => self.expand_next()?,
            done => done,
        };
        Ok(self.phase)
    }

    /// Steps until the run succeeds or exhausts the fringe.
    pub fn run(mut self) -> Result<Outcome, SearchError> {
        while !self.phase.is_terminal() {
            self.step()?;
        }
        Ok(self.into_outcome())
    }

    /// The solution found so far, if the run has succeeded.
    pub fn solution(&self) -> Option<Solution> {
        self.solution_id.map(|id| Solution {
            path: self.history.path_to(id),
            stats: self.stats.clone(),
        })
    }

    pub fn into_outcome(self) -> Outcome {
        match self.solution() {
            Some(solution) => Outcome::Solved(solution),
            None => Outcome::Exhausted(self.stats),
        }
    }

    fn initialize(&mut self) -> Result<Phase, SearchError> {
        let root_id = 0;
        if self.goal.is_reached_by(self.history[root_id].state()) {
            info!("Initial state already matches the goal");
            self.solution_id = Some(root_id);
            return Ok(Phase::Succeeded);
        }

        self.expand(root_id)?;
        Ok(self.continue_or_exhaust())
    }

    fn expand_next(&mut self) -> Result<Phase, SearchError> {
        let Some(action) = self.select() else {
            return Ok(self.continue_or_exhaust());
        };

        let id = self.history.push(action);
        self.stats.expanded += 1;

        let action = &self.history[id];
        debug!(
            "Expanding #{} (parent #{:?}, cost {}, depth {}), fringe size {}",
            id,
            action.parent(),
            action.cost(),
            action.depth(),
            self.fringe.len()
        );

        if self.goal.is_reached_by(action.state()) {
            info!(
                "Goal reached at depth {} after {} expansions",
                action.depth(),
                self.stats.expanded
            );
            self.solution_id = Some(id);
            return Ok(Phase::Succeeded);
        }

        self.expand(id)?;
        Ok(self.continue_or_exhaust())
    }

    fn continue_or_exhaust(&self) -> Phase {
        if self.fringe.is_empty() {
            info!(
                "Fringe exhausted after {} expansions, no solution",
                self.stats.expanded
            );
            Phase::Exhausted
        } else {
            Phase::Expanding
        }
    }

    /// Takes the next fringe entry whose state still needs expanding.
    ///
    /// An entry can go stale when another copy of its state was expanded after it
    /// was enqueued; such entries are dropped here.
    fn select(&mut self) -> Option<Action> {
        while let Some(action) = self.fringe.take(&mut self.rng) {
            let stale = self
                .history
                .find_state(action.state())
                .is_some_and(|id| self.history[id].cost() <= action.cost());
            if !stale {
                return Some(action);
            }
            trace!("Dropping stale fringe entry at cost {}", action.cost());
            self.stats.duplicates_discarded += 1;
        }
        None
    }

    fn expand(&mut self, id: NodeId) -> Result<(), SearchError> {
        let next_generation = successors(id, &self.history[id], self.goal.width(), self.cost)?;

        for next in next_generation {
            self.stats.generated += 1;
            *self.stats.nodes_per_depth.entry(next.depth()).or_insert(0) += 1;

            if self.was_already_expanded(&next) {
                continue;
            }

            if self.suppress_fringe_duplicates && self.fringe.contains_state(next.state()) {
                trace!("Dropping successor already on the fringe");
                self.stats.fringe_duplicates_discarded += 1;
                continue;
            }

            self.fringe.push(next);
        }

        self.fringe.sort();
        self.stats.peak_fringe = self.stats.peak_fringe.max(self.fringe.len());
        Ok(())
    }

    /// Duplicate check against the history, newest entries first.
    ///
    /// A visited copy with a higher cost than `next` means the cost model is not
    /// monotonic; that is reported and then handled per the regression policy.
    fn was_already_expanded(&mut self, next: &Action) -> bool {
        let Some(visited_id) = self.history.find_state(next.state()) else {
            return false;
        };

        let visited_cost = self.history[visited_id].cost();
        if visited_cost > next.cost() {
            warn!(
                "Cost regression: state #{} was expanded at cost {} but is reachable at cost {}",
                visited_id,
                visited_cost,
                next.cost()
            );
            self.stats.cost_regressions.push(CostRegression {
                visited_id,
                visited_cost,
                new_cost: next.cost(),
            });
            if self.regression_policy == RegressionPolicy::Reinsert {
                return false;
            }
        }

        trace!("Dropping successor of already expanded state #{}", visited_id);
        self.stats.duplicates_discarded += 1;
        true
    }
}

/// Runs searches towards a fixed goal with a fixed cost strategy.
///
/// # Examples
/// ```
/// use sliding_puzzle_solver::costs::{AStar, UnitWeight};
/// use sliding_puzzle_solver::engine::{Dimensions, Goal, Move, State};
/// use sliding_puzzle_solver::heuristics::ManhattanDistance;
/// use sliding_puzzle_solver::solver::{SearchOptions, Solver};
///
/// let goal = Goal::canonical(Dimensions::new(3, 3).unwrap());
/// let cost = AStar::new(UnitWeight, ManhattanDistance::new(goal.clone()));
/// let options = SearchOptions { seed: Some(1), ..SearchOptions::default() };
/// let mut solver = Solver::new(goal, cost, &options);
///
/// let outcome = solver.solve(State::new(vec![1, 0, 2, 3, 4, 5, 6, 7, 8])).unwrap();
/// assert_eq!(outcome.solution().unwrap().moves(), vec![Move::new(0, 1)]);
/// ```
pub struct Solver<C, R = SmallRng> {
    goal: Goal,
    cost: C,
    rng: R,
    options: SearchOptions,
}

impl<C: CostStrategy> Solver<C, SmallRng> {
    /// Uses a [`SmallRng`] seeded from `options.seed`, or from entropy without one.
    pub fn new(goal: Goal, cost: C, options: &SearchOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Solver::with_rng(goal, cost, rng, options)
    }
}

impl<C: CostStrategy, R: Rng> Solver<C, R> {
    /// Uses the given tie-break generator; `options.seed` is ignored.
    pub fn with_rng(goal: Goal, cost: C, rng: R, options: &SearchOptions) -> Self {
        Solver {
            goal,
            cost,
            rng,
            options: options.clone(),
        }
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Starts a step-wise run from `initial`. The run borrows this solver's generator.
    pub fn search(&mut self, initial: State) -> Result<Search<'_, C, &mut R>, SearchError> {
        Search::new(&self.goal, &self.cost, initial, &mut self.rng, &self.options)
    }

    /// Runs a search from `initial` to completion.
    pub fn solve(&mut self, initial: State) -> Result<Outcome, SearchError> {
        self.search(initial)?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::{AStar, Algorithm, UnitWeight, WeightKind};
    use crate::engine::Dimensions;
    use crate::heuristics::{HeuristicKind, ManhattanDistance, MisplacedTiles};
    use crate::test_util::{goal_3x3, scramble, state, Scramble};
    use quickcheck_macros::quickcheck;
    use std::cell::Cell;
    use std::collections::HashSet;

    fn seeded(seed: u64) -> SearchOptions {
        SearchOptions {
            seed: Some(seed),
            ..SearchOptions::default()
        }
    }

    fn a_star_manhattan(goal: &Goal) -> AStar<UnitWeight, ManhattanDistance> {
        AStar::new(UnitWeight, ManhattanDistance::new(goal.clone()))
    }

    fn replay(start: &State, moves: &[Move]) -> State {
        moves.iter().fold(start.clone(), |s, &mv| s.apply(mv))
    }

    fn goal_2x2() -> Goal {
        Goal::canonical(Dimensions::new(2, 2).unwrap())
    }

    /// Charges `discount` for the first move that lands on `target`, 1 otherwise.
    struct DiscountOnce {
        target: State,
        discount: f64,
        used: Cell<bool>,
    }

    impl CostStrategy for DiscountOnce {
        fn cost(&self, _prior: &State, posterior: &State, _mv: Move) -> Result<f64, SearchError> {
            if *posterior == self.target && !self.used.get() {
                self.used.set(true);
                return Ok(self.discount);
            }
            Ok(1.0)
        }
    }

    #[test]
    fn test_one_move_away() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(7));
        let start = state(&[1, 0, 2, 3, 4, 5, 6, 7, 8]);

        let mut search = solver.search(start).unwrap();
        assert_eq!(search.phase(), Phase::Initializing);
        assert_eq!(search.step().unwrap(), Phase::Expanding);
        assert_eq!(search.fringe().len(), 3);
        assert_eq!(search.step().unwrap(), Phase::Succeeded);
        assert_eq!(search.history().len(), 2);

        let outcome = search.into_outcome();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.moves(), vec![Move::new(0, 1)]);
        assert_eq!(solution.len(), 1);
        assert_eq!(solution.cost(), 1.0);
        assert_eq!(solution.stats().expanded, 1);
    }

    #[test]
    fn test_start_equal_to_goal() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(7));
        let outcome = solver.solve(goal.state().clone()).unwrap();

        let solution = outcome.solution().unwrap();
        assert!(solution.is_empty());
        assert!(solution.moves().is_empty());
        assert_eq!(solution.path().len(), 1);
        assert_eq!(outcome.stats().expanded, 0);
        assert_eq!(outcome.stats().generated, 0);
    }

    #[test]
    fn test_unsolvable_instance_is_exhausted() {
        let goal = goal_2x2();
        // single transposition of the goal: wrong parity
        let start = state(&[0, 2, 1, 3]);

        for algorithm in Algorithm::ALL {
            for heuristic in HeuristicKind::ALL {
                let cost = algorithm
                    .build(Some(WeightKind::Unit.build(&goal)), Some(heuristic.build(&goal)))
                    .unwrap();
                let mut solver = Solver::new(goal.clone(), cost, &seeded(3));
                let mut search = solver.search(start.clone()).unwrap();
                while !search.step().unwrap().is_terminal() {}

                assert_eq!(search.phase(), Phase::Exhausted, "{} / {}", algorithm, heuristic);
                // the 2x2 parity class holds 12 states, each expanded exactly once
                assert_eq!(search.history().len(), 12, "{} / {}", algorithm, heuristic);
                assert!(!search.into_outcome().is_solved());
            }
        }
    }

    #[test]
    fn test_two_moves_away() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(11));
        let start = state(&[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        let outcome = solver.solve(start.clone()).unwrap();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.moves(), vec![Move::new(1, 2), Move::new(0, 1)]);
        assert_eq!(replay(&start, &solution.moves()), *goal.state());
        assert_eq!(solution.path()[0].to_string(), "initial state");
        assert_eq!(solution.path()[1].to_string(), "move [2] right");
    }

    #[test]
    fn test_every_flavour_solves_a_scrambled_board() {
        let goal = goal_3x3();
        let start = scramble(&goal, &[3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8]);
        for algorithm in Algorithm::ALL {
            for heuristic in HeuristicKind::ALL {
                let cost = algorithm
                    .build(Some(WeightKind::Unit.build(&goal)), Some(heuristic.build(&goal)))
                    .unwrap();
                let mut solver = Solver::new(goal.clone(), cost, &seeded(5));
                let outcome = solver.solve(start.clone()).unwrap();
                let solution = outcome.solution().unwrap();
                assert_eq!(
                    replay(&start, &solution.moves()),
                    *goal.state(),
                    "{} / {}",
                    algorithm,
                    heuristic
                );
            }
        }
    }

    #[test]
    fn test_distance_weight_solves() {
        let goal = goal_3x3();
        let start = scramble(&goal, &[0, 2, 1, 3, 0, 2]);
        let cost = Algorithm::BestFirst
            .build(Some(WeightKind::Distance.build(&goal)), None)
            .unwrap();
        let mut solver = Solver::new(goal.clone(), cost, &seeded(9));
        let outcome = solver.solve(start.clone()).unwrap();
        assert_eq!(
            replay(&start, &outcome.solution().unwrap().moves()),
            *goal.state()
        );
    }

    #[test]
    fn test_same_seed_same_traversal() {
        let goal = goal_3x3();
        let start = scramble(&goal, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let run = |seed| {
            let cost = AStar::new(UnitWeight, MisplacedTiles::new(goal.clone()));
            let mut solver = Solver::new(goal.clone(), cost, &seeded(seed));
            let mut search = solver.search(start.clone()).unwrap();
            while !search.step().unwrap().is_terminal() {}
            search
                .history()
                .iter()
                .map(|a| a.state().clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_injected_rng() {
        let goal = goal_3x3();
        let rng = SmallRng::seed_from_u64(99);
        let mut solver = Solver::with_rng(goal.clone(), a_star_manhattan(&goal), rng, &SearchOptions::default());
        let outcome = solver.solve(state(&[1, 0, 2, 3, 4, 5, 6, 7, 8])).unwrap();
        assert!(outcome.is_solved());
    }

    #[test]
    fn test_rejects_invalid_initial_state() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(1));
        assert!(matches!(
            solver.solve(state(&[0, 1, 2, 3])),
            Err(SearchError::SizeMismatch { expected: 9, actual: 4 })
        ));
        assert!(matches!(
            solver.solve(state(&[1, 1, 2, 3, 4, 5, 6, 7, 8])),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fringe_sort_is_total_and_stable() {
        let s = state(&[0, 1, 2, 3]);
        let mut fringe = Fringe::new();
        fringe.push(Action::new(2.0, 0, Move::new(1, 0), s.clone(), 1));
        fringe.push(Action::new(1.0, 3, Move::new(2, 0), s.clone(), 1));
        fringe.push(Action::new(1.0, 1, Move::new(2, 0), s.clone(), 1));
        fringe.push(Action::new(1.0, 1, Move::new(1, 0), s.clone(), 1));
        fringe.sort();

        let order: Vec<(f64, Option<NodeId>, Option<Move>)> =
            fringe.iter().map(|a| (a.cost(), a.parent(), a.mv())).collect();
        assert_eq!(
            order,
            vec![
                (1.0, Some(1), Some(Move::new(1, 0))),
                (1.0, Some(1), Some(Move::new(2, 0))),
                (1.0, Some(3), Some(Move::new(2, 0))),
                (2.0, Some(0), Some(Move::new(1, 0))),
            ]
        );
        assert_eq!(fringe.tie_run_len(), 3);
    }

    #[test]
    fn test_fringe_take_picks_among_ties_only() {
        let s = state(&[0, 1, 2, 3]);
        let mut picked = HashSet::new();
        for seed in 0..200 {
            let mut fringe = Fringe::new();
            fringe.push(Action::new(1.0, 0, Move::new(1, 0), s.clone(), 1));
            fringe.push(Action::new(1.0, 1, Move::new(1, 0), s.clone(), 1));
            fringe.push(Action::new(1.0, 2, Move::new(1, 0), s.clone(), 1));
            fringe.push(Action::new(5.0, 3, Move::new(1, 0), s.clone(), 1));
            fringe.sort();

            let mut rng = SmallRng::seed_from_u64(seed);
            let taken = fringe.take(&mut rng).unwrap();
            assert_eq!(taken.cost(), 1.0);
            assert_eq!(fringe.len(), 3);
            picked.insert(taken.parent());
        }
        assert_eq!(picked.len(), 3);

        let mut empty = Fringe::new();
        assert!(empty.take(&mut SmallRng::seed_from_u64(0)).is_none());
    }

    #[test]
    fn test_history_path_and_lookup() {
        let mut history = VisitedHistory::new();
        let root = Action::root(state(&[1, 0, 2, 3]));
        let root_id = history.push(root.clone());
        let child_state = root.state().apply(Move::new(0, 1));
        let child_id = history.push(Action::new(1.0, root_id, Move::new(0, 1), child_state.clone(), 1));

        assert_eq!(history.find_state(&child_state), Some(child_id));
        assert_eq!(history.find_state(&state(&[3, 2, 1, 0])), None);
        let path = history.path_to(child_id);
        assert_eq!(path.len(), 2);
        assert!(path[0].is_root());
        assert_eq!(path[1].mv(), Some(Move::new(0, 1)));
    }

    #[test]
    fn test_nodes_per_depth_counts_initial_fan_out() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(2));
        let outcome = solver.solve(state(&[1, 0, 2, 3, 4, 5, 6, 7, 8])).unwrap();
        assert_eq!(outcome.stats().nodes_per_depth.get(&1), Some(&3));
        assert_eq!(outcome.stats().generated, 3);
        assert_eq!(outcome.stats().peak_fringe, 3);
    }

    #[test]
    fn test_cycle_back_to_root_is_not_expanded_again() {
        let goal = goal_2x2();
        let start = state(&[0, 2, 1, 3]);
        let cost = DiscountOnce {
            target: start.clone(),
            discount: -5.0,
            used: Cell::new(false),
        };
        let mut solver = Solver::new(goal.clone(), cost, &seeded(4));
        let mut search = solver.search(start.clone()).unwrap();
        while !search.step().unwrap().is_terminal() {}

        let root_expansions = search.history().iter().filter(|a| *a.state() == start).count();
        assert_eq!(root_expansions, 1);
        assert_eq!(search.stats().cost_regressions.len(), 1);
        assert_eq!(search.stats().cost_regressions[0].visited_id, 0);
        assert_eq!(search.phase(), Phase::Exhausted);
    }

    #[test]
    fn test_reinsert_policy_expands_cheaper_copy() {
        let goal = goal_2x2();
        let start = state(&[0, 2, 1, 3]);
        let cost = DiscountOnce {
            target: start.clone(),
            discount: -5.0,
            used: Cell::new(false),
        };
        let options = SearchOptions {
            seed: Some(4),
            regression_policy: RegressionPolicy::Reinsert,
            suppress_fringe_duplicates: false,
        };
        let mut solver = Solver::new(goal.clone(), cost, &options);
        let mut search = solver.search(start.clone()).unwrap();
        while !search.step().unwrap().is_terminal() {}

        let root_expansions = search.history().iter().filter(|a| *a.state() == start).count();
        assert_eq!(root_expansions, 2);
        assert!(!search.stats().cost_regressions.is_empty());
        assert_eq!(search.phase(), Phase::Exhausted);
    }

    #[test]
    fn test_suppress_fringe_duplicates() {
        let goal = goal_3x3();
        let start = scramble(&goal, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let options = SearchOptions {
            seed: Some(8),
            regression_policy: RegressionPolicy::Discard,
            suppress_fringe_duplicates: true,
        };
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &options);
        let mut search = solver.search(start.clone()).unwrap();
        while !search.step().unwrap().is_terminal() {
            let states: HashSet<&State> = search.fringe().iter().map(Action::state).collect();
            assert_eq!(states.len(), search.fringe().len());
        }
        let outcome = search.into_outcome();
        assert_eq!(
            replay(&start, &outcome.solution().unwrap().moves()),
            *goal.state()
        );
    }

    #[test]
    fn test_step_after_termination_is_noop() {
        let goal = goal_3x3();
        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(1));
        let mut search = solver.search(goal.state().clone()).unwrap();
        assert_eq!(search.step().unwrap(), Phase::Succeeded);
        assert_eq!(search.step().unwrap(), Phase::Succeeded);
        assert_eq!(search.history().len(), 1);
    }

    #[quickcheck]
    fn prop_solutions_replay_to_goal(scramble: Scramble, seed: u64) -> bool {
        let goal = scramble.goal().clone();
        let choices = &scramble.choices()[..scramble.choices().len().min(8)];
        let start = crate::test_util::scramble(&goal, choices);

        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(seed));
        match solver.solve(start.clone()).unwrap() {
            Outcome::Solved(solution) => replay(&start, &solution.moves()) == *goal.state(),
            Outcome::Exhausted(_) => false,
        }
    }

    #[quickcheck]
    fn prop_no_state_is_expanded_twice(scramble: Scramble, seed: u64) -> bool {
        let goal = scramble.goal().clone();
        let choices = &scramble.choices()[..scramble.choices().len().min(8)];
        let start = crate::test_util::scramble(&goal, choices);

        let mut solver = Solver::new(goal.clone(), a_star_manhattan(&goal), &seeded(seed));
        let mut search = solver.search(start).unwrap();
        while !search.step().unwrap().is_terminal() {}

        let unique: HashSet<&State> = search.history().iter().map(Action::state).collect();
        unique.len() == search.history().len()
    }
}
