//! Send result classification
//!
//! A finished send task is either a success (one accepted result per event
//! sent) or a `SendFailure`. Partial rejections, short or long result sets
//! and transport errors all end up here:
//! the batch is lost either way and is never retried or split.

use std::fmt;

use relay_protocol::{BulkResponse, EventId, ItemOutcome};
use thiserror::Error;
use tokio::task::JoinError;

use crate::sink::SinkError;

/// One item the sink refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRejection {
    /// Identifier of the refused event
    pub id: EventId,
    /// Error category reported by the sink
    pub code: String,
    /// Human-readable reason
    pub reason: String,
}

impl fmt::Display for ItemRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.id, self.code, self.reason)
    }
}

/// Why a send task failed
#[derive(Debug, Error)]
pub enum SendFailure {
    /// Sink accepted the call but refused one or more items
    #[error("{} of {total} items rejected by sink", .rejections.len())]
    Rejected {
        /// Items in the batch
        total: usize,
        /// Every refused item, in sink order
        rejections: Vec<ItemRejection>,
    },

    /// Sink answered with a different number of item results than events sent
    #[error("sink reported {received} item results for {expected} events")]
    Incomplete {
        /// Events in the batch
        expected: usize,
        /// Item results in the response
        received: usize,
    },

    /// Whole call failed
    #[error("sink call failed: {0}")]
    Transport(#[from] SinkError),

    /// Send task panicked or was cancelled before reporting
    #[error("send task aborted: {0}")]
    Aborted(String),
}

impl SendFailure {
    /// Rejected items, empty for transport and abort failures
    pub fn rejections(&self) -> &[ItemRejection] {
        match self {
            Self::Rejected { rejections, .. } => rejections,
            _ => &[],
        }
    }

    /// Short category label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Incomplete { .. } => "incomplete",
            Self::Transport(_) => "transport",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Classify a sink response for a batch of `expected` events
///
/// Any rejected item fails the whole send, as does a result count that
/// differs from the batch size.
pub fn classify_response(
    response: BulkResponse,
    expected: usize,
) -> Result<BulkResponse, SendFailure> {
    if response.len() != expected {
        return Err(SendFailure::Incomplete {
            expected,
            received: response.len(),
        });
    }

    if !response.has_rejections() {
        return Ok(response);
    }

    let rejections = response
        .rejected()
        .filter_map(|item| match &item.outcome {
            ItemOutcome::Rejected { code, reason } => Some(ItemRejection {
                id: item.id.clone(),
                code: code.clone(),
                reason: reason.clone(),
            }),
            ItemOutcome::Accepted => None,
        })
        .collect();

    Err(SendFailure::Rejected {
        total: response.len(),
        rejections,
    })
}

/// Classify the joined result of a send task for a batch of `expected` events
pub fn classify(
    joined: Result<Result<BulkResponse, SinkError>, JoinError>,
    expected: usize,
) -> Result<BulkResponse, SendFailure> {
    match joined {
        Ok(Ok(response)) => classify_response(response, expected),
        Ok(Err(e)) => Err(SendFailure::Transport(e)),
        Err(e) if e.is_cancelled() => Err(SendFailure::Aborted("cancelled".into())),
        Err(e) => Err(SendFailure::Aborted(format!("panicked: {e}"))),
    }
}
