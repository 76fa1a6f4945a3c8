//! Serve command - Run the relay
//!
//! Wires the receiver, the event queue, the flush scheduler and the sink,
//! then runs until SIGINT or SIGTERM.
//!
//! # Shutdown order
//!
//! 1. The receiver stops accepting and finishes in-flight requests
//! 2. The scheduler cuts its final batches (or drops the queue) and drains
//!    in-flight sends, bounded by `buffer.shutdown_timeout`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use relay_config::{BufferConfig, Config, ElasticsearchSinkConfig, ReceiverConfig, SinkConfig};
use relay_pipeline::{EventQueue, FlushScheduler, SchedulerConfig, SinkClient};
use relay_sinks::{ElasticsearchConfig, ElasticsearchSink, NullSink, SinkMetrics, StdoutSink};
use relay_sources::{HttpReceiver, HttpReceiverConfig, HttpSourceError};

use crate::reporter::MetricsReporter;

/// The configured sink with its metrics handle
pub struct BuiltSink {
    pub client: Arc<dyn SinkClient>,
    pub metrics: Arc<SinkMetrics>,
}

/// Run the serve command
pub async fn run(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults + environment)".to_string());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path,
        "Relay starting"
    );

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("Relay shutdown complete");
    Ok(())
}

/// Main server run loop
async fn run_server(config: Config) -> Result<()> {
    // Receiver and scheduler stop separately so late inserts make the final flush
    let receiver_cancel = CancellationToken::new();
    let scheduler_cancel = CancellationToken::new();

    let queue = Arc::new(
        EventQueue::new(config.buffer.queue_capacity).context("failed to create event queue")?,
    );

    let sink = build_sink(&config.sink)?;
    let sink_name = sink.client.name().to_string();

    let scheduler = FlushScheduler::new(
        Arc::clone(&queue),
        Arc::clone(&sink.client),
        scheduler_config(&config.buffer),
    )
    .context("invalid scheduler configuration")?;
    let pipeline_metrics = scheduler.metrics_handle();

    let mut reporter = MetricsReporter::new(config.metrics.clone())
        .pipeline(Arc::clone(&pipeline_metrics))
        .sink(sink_name.clone(), Arc::clone(&sink.metrics));

    let mut receiver_task: JoinHandle<Result<(), HttpSourceError>> = if config.receiver.enabled {
        let receiver = HttpReceiver::new(receiver_config(&config.receiver), Arc::clone(&queue));
        reporter = reporter.receiver(receiver.metrics());
        tokio::spawn(receiver.run(receiver_cancel.clone()))
    } else {
        warn!("HTTP receiver disabled, nothing will be queued");
        let cancel = receiver_cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            Ok(())
        })
    };

    let scheduler_task = tokio::spawn(scheduler.run(scheduler_cancel.clone()));
    let reporter_task = tokio::spawn(reporter.run(receiver_cancel.clone()));

    info!(
        sink = %sink_name,
        queue_capacity = config.buffer.queue_capacity,
        flush_count_threshold = config.buffer.flush_count_threshold,
        flush_time_threshold = ?config.buffer.flush_time_threshold,
        flush_on_shutdown = config.buffer.flush_on_shutdown,
        "Relay running"
    );

    // Either a signal or the receiver dying ends the run
    let receiver_exit = tokio::select! {
        _ = wait_for_shutdown() => {
            info!("shutdown signal received, stopping relay...");
            None
        }
        result = &mut receiver_task => Some(result),
    };

    receiver_cancel.cancel();
    let shutdown_timeout = config.buffer.shutdown_timeout;

    let receiver_error = match receiver_exit {
        Some(Ok(Ok(()))) => {
            warn!("HTTP receiver stopped unexpectedly");
            None
        }
        Some(Ok(Err(e))) => Some(anyhow::Error::new(e).context("HTTP receiver failed")),
        Some(Err(e)) => Some(anyhow::anyhow!("HTTP receiver task panicked: {}", e)),
        None => {
            info!("waiting for receiver to finish in-flight requests...");
            match tokio::time::timeout(shutdown_timeout, receiver_task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => warn!(error = %e, "receiver error during shutdown"),
                Ok(Err(e)) => warn!(error = %e, "receiver task panicked during shutdown"),
                Err(_) => warn!("receiver did not finish within timeout, continuing shutdown"),
            }
            None
        }
    };

    // Now nothing else is inserted; let the scheduler flush and drain
    scheduler_cancel.cancel();
    info!("waiting for in-flight sends to drain...");
    match tokio::time::timeout(shutdown_timeout, scheduler_task).await {
        Ok(Ok(report)) => info!(
            final_batches = report.final_batches,
            dropped_events = report.dropped_events,
            succeeded = report.drained.succeeded,
            failed = report.drained.failed,
            "pipeline drained"
        ),
        Ok(Err(e)) => warn!(error = %e, "scheduler task panicked"),
        Err(_) => warn!(
            timeout = ?shutdown_timeout,
            "in-flight sends did not finish within timeout, abandoning them"
        ),
    }

    reporter_task.abort();

    let totals = pipeline_metrics.snapshot();
    info!(
        events_inserted = totals.events_inserted,
        events_evicted = totals.events_evicted,
        batches = totals.batches_flushed(),
        events_delivered = totals.events_delivered,
        events_lost = totals.events_lost,
        "final pipeline totals"
    );

    match receiver_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Build the configured sink
pub fn build_sink(config: &SinkConfig) -> Result<BuiltSink> {
    match config {
        SinkConfig::Elasticsearch(es) => {
            let sink = ElasticsearchSink::new(elasticsearch_config(es))
                .context("failed to create elasticsearch sink")?;
            info!(hosts = ?es.hosts, index = %es.index, "elasticsearch sink configured");
            let metrics = sink.metrics();
            Ok(BuiltSink {
                client: Arc::new(sink),
                metrics,
            })
        }
        SinkConfig::Null => {
            let sink = NullSink::new();
            let metrics = sink.metrics();
            Ok(BuiltSink {
                client: Arc::new(sink),
                metrics,
            })
        }
        SinkConfig::Stdout => {
            let sink = StdoutSink::new();
            let metrics = sink.metrics();
            Ok(BuiltSink {
                client: Arc::new(sink),
                metrics,
            })
        }
    }
}

pub fn scheduler_config(buffer: &BufferConfig) -> SchedulerConfig {
    SchedulerConfig::default()
        .with_flush_count_threshold(buffer.flush_count_threshold)
        .with_flush_time_threshold(buffer.flush_time_threshold)
        .with_loop_wait(buffer.loop_wait)
        .with_drain_poll_interval(buffer.drain_poll_interval)
        .with_flush_on_shutdown(buffer.flush_on_shutdown)
}

pub fn receiver_config(receiver: &ReceiverConfig) -> HttpReceiverConfig {
    HttpReceiverConfig {
        address: receiver.address.clone(),
        port: receiver.port,
        bearer_token: receiver.bearer_token.clone(),
        max_payload_size: receiver.max_payload_size,
        id_field: receiver.id_field.clone(),
    }
}

pub fn elasticsearch_config(es: &ElasticsearchSinkConfig) -> ElasticsearchConfig {
    ElasticsearchConfig {
        hosts: es.hosts.clone(),
        index: es.index.clone(),
        username: es.username.clone(),
        password: es.password.clone(),
        verify_tls: es.verify_tls,
        request_timeout: es.request_timeout,
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
