//! Error type shared by the whole crate.

/// Errors raised while building strategies or running a search.
///
/// Running out of fringe entries is not an error; see [`crate::solver::Outcome::Exhausted`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A required value was missing or structurally invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A state's length disagrees with the goal's length.
    #[error("state has {actual} tiles but the goal has {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Board text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }
}
