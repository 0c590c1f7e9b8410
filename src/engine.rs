//! Core model of the sliding-tile puzzle.
//!
//! This module defines the pieces every other module builds on:
//! - `State`: an immutable, fixed-length sequence of tiles laid out row by row.
//! - `Goal`: the target state together with its grid `Dimensions`.
//! - `Move` and `Direction`: a single tile sliding into the empty slot.
//! - `Action`: the unit the search engine stores in its fringe and visited history.
//! - `CoordinateTracker`: an incremental index-to-coordinate projection used by heuristics.
//! - `LegalMoves`: the state-transition function, enumerating every legal move of a state.
use crate::error::SearchError;
use std::fmt;

/// Value stored in a single grid cell.
pub type Tile = u16;

/// The value marking the empty slot.
pub const EMPTY_TILE: Tile = 0;

/// Index of an action inside the visited history.
pub type NodeId = usize;

/// Width and height of a puzzle grid. Both are always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    /// Creates grid dimensions, rejecting a zero width or height.
    ///
    /// # Examples
    /// ```
    /// use sliding_puzzle_solver::engine::Dimensions;
    /// let dims = Dimensions::new(3, 3).unwrap();
    /// assert_eq!(dims.cell_count(), 9);
    /// assert!(Dimensions::new(0, 3).is_err());
    /// ```
    pub fn new(width: usize, height: usize) -> Result<Self, SearchError> {
        if width == 0 {
            return Err(SearchError::invalid("width must be positive"));
        }
        if height == 0 {
            return Err(SearchError::invalid("height must be positive"));
        }
        Ok(Dimensions { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in the grid (`width * height`).
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A board configuration, stored row-major.
///
/// States are values: [`State::apply`] always returns a fresh copy and never touches
/// the receiver, so a state referenced from the fringe or the visited history stays
/// exactly as it was when that entry was created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    tiles: Vec<Tile>,
}

impl State {
    pub fn new(tiles: Vec<Tile>) -> Self {
        State { tiles }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Returns the tile at `index`.
    ///
    /// # Panics
    /// Panics if `index` is outside the state.
    pub fn get(&self, index: usize) -> Tile {
        self.tiles[index]
    }

    /// Position of the empty marker, if the state has one.
    pub fn empty_index(&self) -> Option<usize> {
        self.tiles.iter().position(|&t| t == EMPTY_TILE)
    }

    /// Checks the tile invariant: exactly one empty marker and every value
    /// `1..len` present exactly once. Says nothing about solvability.
    pub fn validate(&self) -> Result<(), SearchError> {
        let count = self.tiles.len();
        if count == 0 {
            return Err(SearchError::invalid("state must not be empty"));
        }

        let mut seen = vec![false; count];
        for (index, &tile) in self.tiles.iter().enumerate() {
            let slot = tile as usize;
            if slot >= count {
                return Err(SearchError::invalid(format!(
                    "tile {} at index {} is out of range for {} cells",
                    tile, index, count
                )));
            }
            if seen[slot] {
                return Err(SearchError::invalid(format!(
                    "tile {} appears more than once",
                    tile
                )));
            }
            seen[slot] = true;
        }
        Ok(())
    }

    /// Produces the posterior state of `mv`: a copy of `self` with the tiles at
    /// `mv.from` and `mv.to` exchanged.
    ///
    /// # Panics
    /// Panics if either index lies outside the state.
    ///
    /// # Examples
    /// ```
    /// use sliding_puzzle_solver::engine::{Move, State};
    /// let prior = State::new(vec![1, 0, 2, 3]);
    /// let posterior = prior.apply(Move::new(0, 1));
    /// assert_eq!(posterior.tiles(), &[0, 1, 2, 3]);
    /// assert_eq!(prior.tiles(), &[1, 0, 2, 3]);
    /// ```
    pub fn apply(&self, mv: Move) -> State {
        let mut tiles = self.tiles.clone();
        tiles.swap(mv.from, mv.to);
        State { tiles }
    }

    /// Enumerates the legal moves of this state on a grid of the given `width`.
    pub fn legal_moves(&self, width: usize) -> LegalMoves<'_> {
        LegalMoves::new(&self.tiles, width)
    }

    /// Renders the state as a plain text grid, one row per line.
    pub fn to_grid_string(&self, width: usize) -> String {
        let cell_width = self.tiles.len().saturating_sub(1).to_string().len() + 1;
        let mut output = String::new();
        for (row_idx, row) in self.tiles.chunks(width.max(1)).enumerate() {
            if row_idx > 0 {
                output.push('\n');
            }
            for &tile in row {
                if tile == EMPTY_TILE {
                    output.push_str(&format!("{:>w$}", ".", w = cell_width));
                } else {
                    output.push_str(&format!("{:>w$}", tile, w = cell_width));
                }
            }
        }
        output
    }
}

impl From<Vec<Tile>> for State {
    fn from(tiles: Vec<Tile>) -> Self {
        State::new(tiles)
    }
}

/// The target of a search: a valid state plus the grid it lives on.
///
/// Every weight and heuristic strategy is built from a `Goal`; it never changes
/// after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    state: State,
    dimensions: Dimensions,
}

impl Goal {
    /// Validates `state` against `dimensions` and wraps both.
    pub fn new(state: State, dimensions: Dimensions) -> Result<Self, SearchError> {
        if state.len() != dimensions.cell_count() {
            return Err(SearchError::SizeMismatch {
                expected: dimensions.cell_count(),
                actual: state.len(),
            });
        }
        state.validate()?;
        Ok(Goal { state, dimensions })
    }

    /// The goal with the empty slot first, followed by `1..N` in order.
    ///
    /// # Examples
    /// ```
    /// use sliding_puzzle_solver::engine::{Dimensions, Goal};
    /// let goal = Goal::canonical(Dimensions::new(3, 3).unwrap());
    /// assert_eq!(goal.state().tiles(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    /// ```
    pub fn canonical(dimensions: Dimensions) -> Self {
        let tiles = (0..dimensions.cell_count()).map(|t| t as Tile).collect();
        Goal {
            state: State::new(tiles),
            dimensions,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn tiles(&self) -> &[Tile] {
        self.state.tiles()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Fails unless `state` is non-empty and as long as the goal.
    pub fn check_size(&self, state: &State) -> Result<(), SearchError> {
        if state.is_empty() {
            return Err(SearchError::invalid("state must not be empty"));
        }
        if state.len() != self.len() {
            return Err(SearchError::SizeMismatch {
                expected: self.len(),
                actual: state.len(),
            });
        }
        Ok(())
    }

    /// Element-wise comparison against the goal.
    pub fn is_reached_by(&self, state: &State) -> bool {
        self.state == *state
    }
}

/// Direction a tile travels when it slides into the empty slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Enumeration order used by [`LegalMoves`].
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// A tile at `from` sliding into the empty slot at `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Move { from, to }
    }

    /// The move that undoes `self`.
    pub fn inverse(self) -> Move {
        Move {
            from: self.to,
            to: self.from,
        }
    }

    /// A no-op move whose source and target coincide.
    pub fn is_degenerate(self) -> bool {
        self.from == self.to
    }

    /// Classifies the move by comparing its indices; `None` for a degenerate move.
    pub fn direction(self) -> Option<Direction> {
        if self.from == self.to {
            None
        } else if self.to + 1 == self.from {
            Some(Direction::Left)
        } else if self.to == self.from + 1 {
            Some(Direction::Right)
        } else if self.to < self.from {
            Some(Direction::Up)
        } else {
            Some(Direction::Down)
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A node of the search tree.
///
/// An action records the cumulative cost of reaching `state`, the visited-history
/// id of the action it was expanded from, the move that produced it and its depth.
/// Parents are referenced by index, never by pointer, so the visited history is a
/// plain arena. Actions are immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    cost: f64,
    parent: Option<NodeId>,
    mv: Option<Move>,
    state: State,
    depth: usize,
}

impl Action {
    /// The start node: no parent, no move, zero cost, depth zero.
    pub fn root(state: State) -> Self {
        Action {
            cost: 0.0,
            parent: None,
            mv: None,
            state,
            depth: 0,
        }
    }

    pub fn new(cost: f64, parent: NodeId, mv: Move, state: State, depth: usize) -> Self {
        Action {
            cost,
            parent: Some(parent),
            mv: Some(mv),
            state,
            depth,
        }
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Visited-history id of the parent; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The move that produced this action; `None` for the root.
    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The tile that was moved, read from its new position in the posterior state.
    pub fn moved_tile(&self) -> Option<Tile> {
        self.mv.map(|mv| self.state.get(mv.to))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mv, self.moved_tile()) {
            (Some(mv), Some(tile)) => {
                let direction = mv
                    .direction()
                    .map_or_else(|| "nowhere".to_string(), |d| d.to_string());
                write!(f, "move [{}] {}", tile, direction)
            }
            _ => f.write_str("initial state"),
        }
    }
}

/// Incremental projection of a linear index onto `(x, y)` grid coordinates.
///
/// Scans over a state visit indices in increasing order, so the common case is a
/// single-step [`advance`](Self::advance). [`seek`](Self::seek) handles arbitrary
/// jumps by recomputing from scratch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateTracker {
    width: usize,
    index: usize,
    x: usize,
    y: usize,
}

impl CoordinateTracker {
    pub fn new(width: usize) -> Self {
        debug_assert!(width > 0, "grid width must be positive");
        CoordinateTracker {
            width,
            index: 0,
            x: 0,
            y: 0,
        }
    }

    /// Moves back to the origin.
    pub fn reset(&mut self) {
        self.index = 0;
        self.x = 0;
        self.y = 0;
    }

    pub fn advance(&mut self) {
        self.index += 1;
        self.x += 1;
        if self.x == self.width {
            self.x = 0;
            self.y += 1;
        }
    }

    pub fn seek(&mut self, index: usize) {
        if index == self.index {
            return;
        }
        if index == self.index + 1 {
            self.advance();
            return;
        }
        self.index = index;
        self.x = index % self.width;
        self.y = index / self.width;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }
}

/// Iterator over the legal moves of a state.
///
/// Tiles are scanned in index order and, for each non-empty tile, its neighbours are
/// tried left, right, up, down. A move is legal when the neighbour holds the empty
/// marker. Row boundaries are tracked as the scan advances instead of dividing on
/// every step. Call [`State::legal_moves`] again to enumerate from the start.
#[derive(Clone, Debug)]
pub struct LegalMoves<'a> {
    tiles: &'a [Tile],
    width: usize,
    index: usize,
    index_in_row: usize,
    next_direction: usize,
}

impl<'a> LegalMoves<'a> {
    fn new(tiles: &'a [Tile], width: usize) -> Self {
        assert!(width > 0, "grid width must be positive");
        LegalMoves {
            tiles,
            width,
            index: 0,
            index_in_row: 0,
            next_direction: 0,
        }
    }

    fn step_to_next_index(&mut self) {
        self.index += 1;
        self.next_direction = 0;
        self.index_in_row += 1;
        if self.index_in_row == self.width {
            self.index_in_row = 0;
        }
    }

    fn neighbour(&self, direction: Direction) -> Option<usize> {
        let i = self.index;
        match direction {
            Direction::Left => (self.index_in_row > 0).then(|| i - 1),
            Direction::Right => (self.index_in_row + 1 < self.width).then(|| i + 1),
            Direction::Up => i.checked_sub(self.width),
            Direction::Down => Some(i + self.width),
        }
        .filter(|&target| target < self.tiles.len())
    }

    fn is_free_slot_at(&self, index: usize) -> bool {
        assert!(
            index < self.tiles.len(),
            "neighbour index {} outside state of {} tiles",
            index,
            self.tiles.len()
        );
        self.tiles[index] == EMPTY_TILE
    }
}

impl Iterator for LegalMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        while self.index < self.tiles.len() {
            if self.tiles[self.index] != EMPTY_TILE {
                while self.next_direction < Direction::ALL.len() {
                    let direction = Direction::ALL[self.next_direction];
                    self.next_direction += 1;
                    if let Some(target) = self.neighbour(direction) {
                        if self.is_free_slot_at(target) {
                            return Some(Move::new(self.index, target));
                        }
                    }
                }
            }
            self.step_to_next_index();
        }
        None
    }
}
