//! Null sink - accepts and discards all data
//!
//! Used for benchmarking the pipeline without any I/O overhead, and for
//! running the relay without a search cluster during development.
//!
//! # Example
//!
//! ```ignore
//! use relay_sinks::NullSink;
//!
//! let sink = Arc::new(NullSink::new());
//! let scheduler = FlushScheduler::new(queue, sink, config)?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use relay_pipeline::{SinkClient, SinkError};
use relay_protocol::{Batch, BulkResponse};

use crate::common::SinkMetrics;

/// Sink that accepts every item and keeps nothing
pub struct NullSink {
    name: String,
    metrics: Arc<SinkMetrics>,
}

impl NullSink {
    /// Create a null sink named "null"
    pub fn new() -> Self {
        Self::with_name("null")
    }

    /// Create a null sink with a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Shared metrics; stays valid after the sink is moved into the scheduler
    #[inline]
    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SinkClient for NullSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, batch: Batch) -> Result<BulkResponse, SinkError> {
        self.metrics.record_sent(batch.len() as u64, 0, 0);
        Ok(BulkResponse::all_accepted(&batch))
        // Batch is dropped here
    }
}

#[cfg(test)]
#[path = "null_test.rs"]
mod null_test;
