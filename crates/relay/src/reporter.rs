//! Periodic metrics reporter
//!
//! Collects snapshots from the pipeline, the receiver and the sink and
//! logs them at the configured interval.
//!
//! # Example Output (human)
//!
//! ```text
//! [metrics] pipeline: +120 in | 0 evicted | 12 batches (10 count, 2 time) | 12 ok, 0 failed | 0 lost
//! [metrics] receiver: 14 req | 2 client err | 1 auth fail | 120 accepted, 0 rejected
//! [metrics] sink elasticsearch: 12 batches | 120 accepted, 0 rejected | 48.2 KB | 0 failures
//! ```

use std::sync::Arc;

use relay_config::{MetricsConfig, MetricsFormat};
use relay_pipeline::{MetricsSnapshot, PipelineMetrics};
use relay_sinks::{MetricsSnapshot as SinkSnapshot, SinkMetrics};
use relay_sources::{HttpMetricsSnapshot, HttpReceiverMetrics};
use serde_json::{Value, json};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Snapshots gathered in one reporting round
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Pipeline totals and the change since the previous round
    pub pipeline: Option<(MetricsSnapshot, MetricsSnapshot)>,
    pub receiver: Option<HttpMetricsSnapshot>,
    pub sink: Option<(String, SinkSnapshot)>,
}

/// Metrics reporter
pub struct MetricsReporter {
    config: MetricsConfig,
    pipeline: Option<Arc<PipelineMetrics>>,
    receiver: Option<Arc<HttpReceiverMetrics>>,
    sink: Option<(String, Arc<SinkMetrics>)>,
    previous: Option<MetricsSnapshot>,
}

impl MetricsReporter {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            config,
            pipeline: None,
            receiver: None,
            sink: None,
            previous: None,
        }
    }

    pub fn pipeline(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.pipeline = Some(metrics);
        self
    }

    pub fn receiver(mut self, metrics: Arc<HttpReceiverMetrics>) -> Self {
        self.receiver = Some(metrics);
        self
    }

    pub fn sink(mut self, name: impl Into<String>, metrics: Arc<SinkMetrics>) -> Self {
        self.sink = Some((name.into(), metrics));
        self
    }

    /// Run the reporter until cancellation
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("metrics reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately
        ticker.tick().await;

        info!(
            interval_secs = self.config.interval.as_secs(),
            format = ?self.config.format,
            "metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("metrics reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Collect and log metrics once
    pub fn report(&mut self) {
        let collected = self.collect();

        match self.config.format {
            MetricsFormat::Human => {
                for line in format_human(&collected) {
                    info!("{}", line);
                }
            }
            MetricsFormat::Json => {
                info!(metrics = %format_json(&collected), "metrics");
            }
        }
    }

    fn collect(&mut self) -> Collected {
        let mut collected = Collected::default();

        if self.config.include_pipeline
            && let Some(ref metrics) = self.pipeline
        {
            let current = metrics.snapshot();
            let delta = match self.previous {
                Some(ref prev) => current.diff(prev),
                None => current,
            };
            self.previous = Some(current);
            collected.pipeline = Some((current, delta));
        }

        if self.config.include_receiver
            && let Some(ref metrics) = self.receiver
        {
            collected.receiver = Some(metrics.snapshot());
        }

        if self.config.include_sink
            && let Some((ref name, ref metrics)) = self.sink
        {
            collected.sink = Some((name.clone(), metrics.snapshot()));
        }

        collected
    }
}

/// Render one line per component
pub fn format_human(collected: &Collected) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some((total, delta)) = &collected.pipeline {
        lines.push(format!(
            "[metrics] pipeline: +{} in | {} evicted | {} batches ({} count, {} time) | {} ok, {} failed | {} lost",
            delta.events_inserted,
            total.events_evicted,
            total.batches_flushed(),
            total.batches_by_count,
            total.batches_by_time,
            total.sends_succeeded,
            total.sends_failed,
            total.events_lost,
        ));
    }

    if let Some(r) = &collected.receiver {
        lines.push(format!(
            "[metrics] receiver: {} req | {} client err | {} auth fail | {} accepted, {} rejected",
            r.requests_total,
            r.requests_client_error,
            r.auth_failures,
            r.events_accepted,
            r.events_rejected,
        ));
    }

    if let Some((name, s)) = &collected.sink {
        lines.push(format!(
            "[metrics] sink {}: {} batches | {} accepted, {} rejected | {} | {} failures",
            name,
            s.batches_sent,
            s.events_accepted,
            s.events_rejected,
            format_bytes(s.bytes_written),
            s.send_failures,
        ));
    }

    lines
}

/// Render all components as one JSON object
pub fn format_json(collected: &Collected) -> Value {
    let mut out = serde_json::Map::new();

    if let Some((total, delta)) = &collected.pipeline {
        out.insert(
            "pipeline".into(),
            json!({
                "events_inserted": total.events_inserted,
                "events_inserted_delta": delta.events_inserted,
                "events_evicted": total.events_evicted,
                "batches_by_count": total.batches_by_count,
                "batches_by_time": total.batches_by_time,
                "batches_on_shutdown": total.batches_on_shutdown,
                "sends_succeeded": total.sends_succeeded,
                "sends_failed": total.sends_failed,
                "events_delivered": total.events_delivered,
                "events_lost": total.events_lost,
            }),
        );
    }

    if let Some(r) = &collected.receiver {
        out.insert(
            "receiver".into(),
            json!({
                "requests_total": r.requests_total,
                "requests_success": r.requests_success,
                "requests_client_error": r.requests_client_error,
                "auth_failures": r.auth_failures,
                "events_accepted": r.events_accepted,
                "events_rejected": r.events_rejected,
                "events_evicted": r.events_evicted,
                "bytes_received": r.bytes_received,
            }),
        );
    }

    if let Some((name, s)) = &collected.sink {
        out.insert(
            "sink".into(),
            json!({
                "name": name,
                "batches_sent": s.batches_sent,
                "events_accepted": s.events_accepted,
                "events_rejected": s.events_rejected,
                "bytes_written": s.bytes_written,
                "send_failures": s.send_failures,
            }),
        );
    }

    Value::Object(out)
}

fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
