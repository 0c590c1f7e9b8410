//! # Sliding Puzzle Solver Library
//!
//! This library provides a configurable best-first search engine for sliding tile
//! puzzles (the 8-puzzle, 15-puzzle and any other `W x H` grid with one empty slot).
//!
//! It is used by two binaries:
//! - `ai_solver`: Takes a board file, a cost model and an optional goal, then
//!   prints the sequence of moves that solves the board.
//! - `heuristic_evaluator`: Runs every heuristic and search flavour over a file of
//!   boards and reports how many expansions each combination needs on average.
//!
//! ## Modules
//! - `engine`: Board representation (`State`, `Goal`, `Dimensions`), moves, search tree
//!   nodes (`Action`) and legal move generation.
//! - `heuristics`: Estimates of the remaining distance to the goal.
//! - `costs`: Edge weights and the cost strategies that turn the engine into best-first,
//!   greedy best-first or A* search.
//! - `solver`: The search loop itself (`Solver`, `Search`) and its statistics.
//! - `utils`: Parsing boards from text.
//! - `error`: The `SearchError` type shared by all of the above.

pub mod costs;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;

#[cfg(test)]
mod test_util;

pub use error::SearchError;
