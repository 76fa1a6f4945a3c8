//! Sink client contract
//!
//! The scheduler only knows sinks through `SinkClient`: hand over a batch,
//! get back a per-item result set or a transport error. Wire formats,
//! authentication and connection handling live in the implementations.

use async_trait::async_trait;
use relay_protocol::{Batch, BulkResponse};
use thiserror::Error;

/// Bulk-write destination for batches
///
/// Implementations must be cheap to share: the scheduler holds one
/// `Arc<dyn SinkClient>` and calls `send` from a spawned task per batch,
/// so several sends may be in flight at once.
#[async_trait]
pub trait SinkClient: Send + Sync {
    /// Short name for logs and metrics
    fn name(&self) -> &str;

    /// Write a batch, returning one result per event
    ///
    /// Returns `Err` only when the call as a whole failed. Per-item
    /// rejections are reported inside the `BulkResponse`.
    async fn send(&self, batch: Batch) -> Result<BulkResponse, SinkError>;
}

/// Errors a sink can return for a whole bulk call
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Sink answered with a non-success status
    #[error("sink returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Sink response could not be understood
    #[error("failed to decode sink response: {0}")]
    Decode(String),

    /// Failed to write data
    #[error("write failed: {0}")]
    Write(String),

    /// Failed to build the request
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Sink misconfigured
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a status error, truncating long bodies
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push_str("...");
        }
        Self::Status { status, body }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Longest response body kept in a `SinkError::Status`
const MAX_ERROR_BODY: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_truncates_body() {
        let err = SinkError::status(500, "x".repeat(2000));
        let SinkError::Status { status, body } = err else {
            panic!("expected status error");
        };
        assert_eq!(status, 500);
        assert_eq!(body.len(), MAX_ERROR_BODY + 3);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn test_status_truncates_on_char_boundary() {
        let err = SinkError::status(400, "é".repeat(600));
        assert!(err.to_string().starts_with("sink returned HTTP 400"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            SinkError::connection("refused").to_string(),
            "connection error: refused"
        );
        assert!(SinkError::decode("eof").to_string().contains("decode"));
    }
}
