//! Error types for the external boundaries
//!
//! None of these ever escape a scheduled tick: the controller turns them into
//! state transitions (classification), placeholders (assets) or an empty
//! store (persistence).

use thiserror::Error;

/// Scenario classification failed; routes the controller back to the menu.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier backend could not be reached or refused the request.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    /// The classifier answered but the descriptor is missing or malformed.
    #[error("invalid scenario descriptor: {0}")]
    InvalidDescriptor(String),
    /// No answer within the caller's budget.
    #[error("classification timed out after {0} ms")]
    Timeout(u64),
    /// The background task went away without handing back a result.
    #[error("classification task ended without a result")]
    TaskLost,
}

impl From<serde_json::Error> for ClassifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDescriptor(err.to_string())
    }
}

/// An image could not be produced; the caller draws a primitive shape instead.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no image for keyword '{0}'")]
    NotFound(String),
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// The score store could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("score store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("score store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
