//! Error types for the Heartline voice coach.

use thiserror::Error;

/// Result type alias for coach operations
pub type CoachResult<T> = Result<T, CoachError>;

/// Errors surfaced to the caller of the coach pipeline.
///
/// Missing risk data and unmatched transcripts are not errors; they resolve to
/// fallback replies. Only a malformed request is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoachError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        CoachError::InvalidRequest(err.to_string())
    }
}
