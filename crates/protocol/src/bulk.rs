//! Bulk write results
//!
//! A sink answers a bulk write with one `ItemResult` per event. The pipeline
//! only cares whether every item was accepted; the per-item code and reason
//! are carried through for the failure report.

use serde::Serialize;

use crate::batch::Batch;
use crate::event::EventId;

/// Outcome of writing a single event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Sink stored the event
    Accepted,
    /// Sink refused the event
    Rejected {
        /// Error category reported by the sink (e.g. `mapper_parsing_exception`)
        code: String,
        /// Human-readable reason
        reason: String,
    },
}

impl ItemOutcome {
    /// Create a rejected outcome
    pub fn rejected(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Check if the item was accepted
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Result for one event in a bulk write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    /// Event the result refers to
    pub id: EventId,
    /// What happened to it
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl ItemResult {
    /// Accepted item
    pub fn accepted(id: EventId) -> Self {
        Self {
            id,
            outcome: ItemOutcome::Accepted,
        }
    }

    /// Rejected item
    pub fn rejected(id: EventId, code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            outcome: ItemOutcome::rejected(code, reason),
        }
    }
}

/// Per-item result set returned by a sink for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResponse {
    items: Vec<ItemResult>,
}

impl BulkResponse {
    /// Create a response from item results
    pub fn new(items: Vec<ItemResult>) -> Self {
        Self { items }
    }

    /// Response in which every event of `batch` was accepted
    pub fn all_accepted(batch: &Batch) -> Self {
        Self {
            items: batch.ids().cloned().map(ItemResult::accepted).collect(),
        }
    }

    /// All item results in sink order
    #[inline]
    pub fn items(&self) -> &[ItemResult] {
        &self.items
    }

    /// Number of item results
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the response carries no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of accepted items
    pub fn accepted_count(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_accepted()).count()
    }

    /// Check if any item was rejected
    pub fn has_rejections(&self) -> bool {
        self.items.iter().any(|i| !i.outcome.is_accepted())
    }

    /// Iterate over rejected items
    pub fn rejected(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(|i| !i.outcome.is_accepted())
    }
}

impl FromIterator<ItemResult> for BulkResponse {
    fn from_iter<T: IntoIterator<Item = ItemResult>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
