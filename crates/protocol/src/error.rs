//! Protocol error types
//!
//! Errors that can occur when turning an inbound record into an `Event`.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Record is not a JSON object
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Identifier field present but unusable
    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },
}

impl ProtocolError {
    /// Create a missing field error
    #[inline]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create an invalid field error
    #[inline]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
