//! Elasticsearch sink - bulk indexing over HTTP
//!
//! Each batch becomes one `POST {host}/_bulk` request. The per-item results
//! of the bulk response are handed back to the scheduler unchanged; the
//! sink itself never retries.
//!
//! # Example
//!
//! ```ignore
//! use relay_sinks::elasticsearch::{ElasticsearchConfig, ElasticsearchSink};
//!
//! let config = ElasticsearchConfig::default()
//!     .with_hosts(["https://es-1:9200", "https://es-2:9200"])
//!     .with_credentials("elastic", "changeme");
//! let sink = Arc::new(ElasticsearchSink::new(config)?);
//! ```

mod bulk;
mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use relay_pipeline::{SinkClient, SinkError};
use relay_protocol::{Batch, BulkResponse};
use reqwest::header::CONTENT_TYPE;

use crate::common::SinkMetrics;

pub use bulk::{encode_bulk, parse_bulk_response, render_index, validate_index_pattern};
pub use config::{
    DEFAULT_HOST, DEFAULT_INDEX_PATTERN, DEFAULT_REQUEST_TIMEOUT, ElasticsearchConfig,
};

/// NDJSON content type required by the bulk API
const NDJSON: &str = "application/x-ndjson";

/// Elasticsearch bulk sink
pub struct ElasticsearchSink {
    config: ElasticsearchConfig,
    client: reqwest::Client,

    /// Round-robin cursor into `config.hosts`
    next_host: AtomicUsize,

    metrics: Arc<SinkMetrics>,
}

impl ElasticsearchSink {
    /// Create a sink from validated configuration
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, SinkError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| SinkError::config(format!("failed to build HTTP client: {e}")))?;

        if !config.verify_tls {
            tracing::warn!("elasticsearch TLS certificate verification disabled");
        }

        Ok(Self {
            config,
            client,
            next_host: AtomicUsize::new(0),
            metrics: Arc::new(SinkMetrics::new()),
        })
    }

    /// Sink configuration
    #[inline]
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Shared metrics handle
    #[inline]
    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bulk endpoint of the next host in rotation
    fn next_url(&self) -> String {
        let i = self.next_host.fetch_add(1, Ordering::Relaxed) % self.config.hosts.len();
        format!("{}/_bulk", self.config.hosts[i].trim_end_matches('/'))
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<bytes::Bytes, SinkError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, NDJSON)
            .body(body);

        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::status(status.as_u16(), body));
        }

        response
            .bytes()
            .await
            .map_err(|e| SinkError::connection(format!("failed to read response: {e}")))
    }
}

#[async_trait]
impl SinkClient for ElasticsearchSink {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn send(&self, batch: Batch) -> Result<BulkResponse, SinkError> {
        if batch.is_empty() {
            return Ok(BulkResponse::default());
        }

        let index = render_index(&self.config.index, Utc::now())?;
        let body = encode_bulk(&batch, &index)?;
        let bytes = body.len() as u64;
        let url = self.next_url();

        let result = match self.post(&url, body).await {
            Ok(raw) => parse_bulk_response(&raw, &batch),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                let accepted = response.accepted_count();
                let rejected = response.len() - accepted;
                self.metrics
                    .record_sent(accepted as u64, rejected as u64, bytes);
                tracing::debug!(
                    url = %url,
                    index = %index,
                    accepted,
                    rejected,
                    bytes,
                    "bulk request completed"
                );
                Ok(response)
            }
            Err(e) => {
                self.metrics.record_failure();
                tracing::warn!(url = %url, index = %index, error = %e, "bulk request failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "elasticsearch_test.rs"]
mod elasticsearch_test;
