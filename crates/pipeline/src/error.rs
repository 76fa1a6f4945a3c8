//! Pipeline error types
//!
//! Construction-time errors for the queue and scheduler. Send failures are
//! not errors of the pipeline itself; see `SendFailure`.

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Queue capacity must be at least one
    #[error("queue capacity must be greater than zero")]
    InvalidCapacity,

    /// Scheduler setting out of range
    #[error("invalid scheduler setting '{field}': {message}")]
    InvalidSetting {
        field: &'static str,
        message: &'static str,
    },
}

impl PipelineError {
    /// Create an invalid setting error
    pub fn invalid_setting(field: &'static str, message: &'static str) -> Self {
        Self::InvalidSetting { field, message }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
