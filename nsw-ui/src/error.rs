//! Error types for nsw-ui
//!
//! Taxonomy of stage failures:
//! - validation: missing input, caught before any network call
//! - backend: well-formed response with a non-success status
//! - transport: network failure or malformed response
//! - io: local file access (export)
//!
//! All of them are terminal for the triggering stage and none is retried.

use nsw_common::events::Stage;
use thiserror::Error;

/// Failure of a single gateway call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Backend answered with a non-success status; message is verbatim
    #[error("{0}")]
    Backend(String),

    /// Network failure or unreadable response
    #[error("{0}")]
    Transport(String),
}

/// Failure of a workflow stage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("{0}")]
    Validation(String),

    #[error("Error: {0}")]
    Backend(String),

    #[error("Communication error: {0}")]
    Transport(String),

    #[error("File error: {0}")]
    Io(String),

    #[error("Another stage is still running ({active}); wait for it to finish")]
    Busy { active: Stage },

    #[error("Cancelled")]
    Declined,
}

impl StageError {
    /// Reviewer-facing text
    pub fn notice(&self) -> String {
        self.to_string()
    }
}

impl From<GatewayError> for StageError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Backend(message) => StageError::Backend(message),
            GatewayError::Transport(description) => StageError::Transport(description),
        }
    }
}

impl From<nsw_common::Error> for StageError {
    fn from(err: nsw_common::Error) -> Self {
        match err {
            nsw_common::Error::InvalidInput(message) => StageError::Validation(message),
            nsw_common::Error::Io(e) => StageError::Io(e.to_string()),
            other @ nsw_common::Error::Config(_) => StageError::Validation(other.to_string()),
        }
    }
}

/// Result type for stage triggers
pub type StageResult<T> = std::result::Result<T, StageError>;
