//! Stdout Sink - JSON lines debug output
//!
//! Writes every event of a batch as one JSON line and accepts all items.
//! Not intended for production use at high throughput.
//!
//! # Example Output
//!
//! ```text
//! {"id":"90020230101","payload":{"log_id":"90020230101","data":{"type":"s","type_description":"Success Login"}}}
//! {"id":"90020230102","payload":{"log_id":"90020230102","data":{"type":"f","type_description":"Failed Login"}}}
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use relay_pipeline::{SinkClient, SinkError};
use relay_protocol::{Batch, BulkResponse};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::common::SinkMetrics;

/// Sink printing events as JSON lines
pub struct StdoutSink<W = Stdout> {
    /// Output, locked per batch so lines from concurrent sends never interleave
    writer: Mutex<W>,

    /// Sink name for logging
    name: String,

    metrics: Arc<SinkMetrics>,
}

impl StdoutSink<Stdout> {
    /// Create a sink writing to process stdout
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }
}

impl Default for StdoutSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StdoutSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Create a sink writing to any async writer
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            name: "stdout".into(),
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Shared metrics handle
    #[inline]
    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Consume the sink and return its writer
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    fn render(batch: &Batch) -> Result<Vec<u8>, SinkError> {
        let mut out = Vec::with_capacity(batch.len() * 256);
        for event in batch.events() {
            serde_json::to_writer(&mut out, event)
                .map_err(|e| SinkError::Serialization(e.to_string()))?;
            out.push(b'\n');
        }
        Ok(out)
    }
}

#[async_trait]
impl<W> SinkClient for StdoutSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, batch: Batch) -> Result<BulkResponse, SinkError> {
        let out = Self::render(&batch)?;

        let mut writer = self.writer.lock().await;
        let written = async {
            writer.write_all(&out).await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = written {
            self.metrics.record_failure();
            return Err(SinkError::write(e.to_string()));
        }

        self.metrics
            .record_sent(batch.len() as u64, 0, out.len() as u64);
        Ok(BulkResponse::all_accepted(&batch))
    }
}
