//! FlushScheduler - dual-trigger batching loop
//!
//! Each tick the scheduler looks at the queue and decides whether to cut a
//! batch, either because more than `flush_count_threshold` events are
//! waiting or because the oldest unflushed event has waited at least
//! `flush_time_threshold`. A cut batch is sent on its own task and handed to
//! the `TaskTracker`; the loop itself never waits on the sink.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use relay_protocol::{Batch, BatchId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::{PipelineError, Result};
use crate::metrics::PipelineMetrics;
use crate::queue::EventQueue;
use crate::sink::SinkClient;
use crate::tracker::{DrainSummary, TaskTracker};

/// Default batch size cap
pub const DEFAULT_FLUSH_COUNT_THRESHOLD: usize = 10;

/// Default maximum age of the oldest unflushed event
pub const DEFAULT_FLUSH_TIME_THRESHOLD: Duration = Duration::from_secs(5);

/// Default scheduling granularity
pub const DEFAULT_LOOP_WAIT: Duration = Duration::from_millis(10);

/// Default sleep between polls while draining at shutdown
pub const DEFAULT_DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Batch size cap; more queued events than this fires the count trigger
    pub flush_count_threshold: usize,

    /// Age of the flush window that fires the time trigger
    pub flush_time_threshold: Duration,

    /// Sleep between ticks
    pub loop_wait: Duration,

    /// Sleep between polls in `drain_blocking`
    pub drain_poll_interval: Duration,

    /// Cut and send the remaining queue when stopping
    pub flush_on_shutdown: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            flush_count_threshold: DEFAULT_FLUSH_COUNT_THRESHOLD,
            flush_time_threshold: DEFAULT_FLUSH_TIME_THRESHOLD,
            loop_wait: DEFAULT_LOOP_WAIT,
            drain_poll_interval: DEFAULT_DRAIN_POLL_INTERVAL,
            flush_on_shutdown: true,
        }
    }
}

impl SchedulerConfig {
    /// Set the batch size cap
    #[must_use]
    pub fn with_flush_count_threshold(mut self, threshold: usize) -> Self {
        self.flush_count_threshold = threshold;
        self
    }

    /// Set the time trigger threshold
    #[must_use]
    pub fn with_flush_time_threshold(mut self, threshold: Duration) -> Self {
        self.flush_time_threshold = threshold;
        self
    }

    /// Set the tick interval
    #[must_use]
    pub fn with_loop_wait(mut self, wait: Duration) -> Self {
        self.loop_wait = wait;
        self
    }

    /// Set the drain poll interval
    #[must_use]
    pub fn with_drain_poll_interval(mut self, interval: Duration) -> Self {
        self.drain_poll_interval = interval;
        self
    }

    /// Enable or disable the shutdown flush
    #[must_use]
    pub fn with_flush_on_shutdown(mut self, enabled: bool) -> Self {
        self.flush_on_shutdown = enabled;
        self
    }

    /// Check that all settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.flush_count_threshold == 0 {
            return Err(PipelineError::invalid_setting(
                "flush_count_threshold",
                "must be greater than zero",
            ));
        }
        if self.flush_time_threshold.is_zero() {
            return Err(PipelineError::invalid_setting(
                "flush_time_threshold",
                "must be non-zero",
            ));
        }
        if self.loop_wait.is_zero() {
            return Err(PipelineError::invalid_setting("loop_wait", "must be non-zero"));
        }
        if self.drain_poll_interval.is_zero() {
            return Err(PipelineError::invalid_setting(
                "drain_poll_interval",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Why a batch was cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// More than `flush_count_threshold` events queued
    Count,
    /// Flush window older than `flush_time_threshold`
    Time,
    /// Final flush while stopping
    Shutdown,
}

impl FlushTrigger {
    /// Label for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Time => "time",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether a tick should cut a batch
///
/// The count trigger is checked first and wins ties; either way the batch
/// is capped at `flush_count_threshold`.
pub fn evaluate_trigger(
    queued: usize,
    window: Option<Instant>,
    now: Instant,
    config: &SchedulerConfig,
) -> Option<FlushTrigger> {
    if queued > config.flush_count_threshold {
        return Some(FlushTrigger::Count);
    }

    match window {
        Some(opened) if now >= opened + config.flush_time_threshold => Some(FlushTrigger::Time),
        _ => None,
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First event of a new accumulation window seen; nothing flushed
    WindowOpened { at: Instant },
    /// A batch was cut and its send started
    Flushed {
        trigger: FlushTrigger,
        batch_id: BatchId,
        events: usize,
    },
    /// Neither trigger fired
    Idle,
}

/// Report returned once the scheduler has fully stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Batches cut by the shutdown flush
    pub final_batches: usize,
    /// Events left in the queue unsent
    pub dropped_events: usize,
    /// Outcome of draining in-flight sends
    pub drained: DrainSummary,
}

/// Dual-trigger flush loop
///
/// # Example
///
/// ```ignore
/// let queue = Arc::new(EventQueue::new(50)?);
/// let scheduler = FlushScheduler::new(Arc::clone(&queue), sink, SchedulerConfig::default())?;
///
/// let cancel = CancellationToken::new();
/// let task = tokio::spawn(scheduler.run(cancel.clone()));
///
/// // ... receiver inserts into `queue` ...
///
/// cancel.cancel();
/// let report = task.await?;
/// ```
pub struct FlushScheduler {
    queue: Arc<EventQueue>,
    sink: Arc<dyn SinkClient>,
    config: SchedulerConfig,
    tracker: TaskTracker,
    metrics: Arc<PipelineMetrics>,

    /// Set when the queue first becomes non-empty, cleared on every drain
    window: Option<Instant>,

    next_batch_id: BatchId,
}

impl FlushScheduler {
    /// Create a scheduler draining `queue` into `sink`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidSetting` if `config` fails validation.
    pub fn new(
        queue: Arc<EventQueue>,
        sink: Arc<dyn SinkClient>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::clone(queue.metrics());
        Ok(Self {
            tracker: TaskTracker::new(Arc::clone(&metrics)),
            queue,
            sink,
            config,
            metrics,
            window: None,
            next_batch_id: BatchId::new(1),
        })
    }

    /// Scheduler settings
    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current flush window start, if any
    #[inline]
    pub fn flush_window(&self) -> Option<Instant> {
        self.window
    }

    /// In-flight sends
    #[inline]
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Metrics shared with the queue and tracker
    ///
    /// Remains valid after `run()` consumes the scheduler.
    pub fn metrics_handle(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one scheduling step at the current instant
    ///
    /// Opens the flush window on the first event of a new accumulation
    /// (without flushing), otherwise evaluates both triggers, cuts at most
    /// one batch and polls the tracker.
    pub async fn tick(&mut self) -> TickOutcome {
        let now = Instant::now();
        let queued = self.queue.size().await;

        if queued > 0 && self.window.is_none() {
            self.window = Some(now);
            tracing::trace!(queued, "flush window opened");
            return TickOutcome::WindowOpened { at: now };
        }

        let outcome = match evaluate_trigger(queued, self.window, now, &self.config) {
            Some(trigger) => match self.flush(trigger).await {
                Some((batch_id, events)) => TickOutcome::Flushed {
                    trigger,
                    batch_id,
                    events,
                },
                None => TickOutcome::Idle,
            },
            None => TickOutcome::Idle,
        };

        self.tracker.poll().await;
        self.queue.report_evictions();
        outcome
    }

    /// Run until `cancel` fires, then stop and drain in-flight sends
    pub async fn run(mut self, cancel: CancellationToken) -> ShutdownReport {
        tracing::info!(
            sink = self.sink.name(),
            queue_capacity = self.queue.capacity(),
            flush_count_threshold = self.config.flush_count_threshold,
            flush_time_threshold_ms = self.config.flush_time_threshold.as_millis() as u64,
            loop_wait_ms = self.config.loop_wait.as_millis() as u64,
            "flush scheduler started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.tick().await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.loop_wait) => {}
            }
        }

        tracing::debug!("flush scheduler loop stopped");
        self.shutdown().await
    }

    /// Stop protocol: optional final flush, then wait for every send
    ///
    /// Only the events queued when this starts are flushed, so a receiver
    /// still inserting cannot keep shutdown going.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        self.queue.flush_eviction_report();
        let queued = self.queue.size().await;

        if queued > 0 {
            if self.config.flush_on_shutdown {
                let mut remaining = queued;
                while remaining > 0 {
                    let Some((_, events)) = self.flush(FlushTrigger::Shutdown).await else {
                        break;
                    };
                    report.final_batches += 1;
                    remaining = remaining.saturating_sub(events);
                }
                tracing::info!(
                    events = queued,
                    batches = report.final_batches,
                    "flushed remaining events on shutdown"
                );
            } else {
                report.dropped_events = queued;
                self.metrics.record_dropped_on_shutdown(queued as u64);
                tracing::warn!(events = queued, "dropping queued events on shutdown");
            }
        }

        report.drained = self
            .tracker
            .drain_blocking(self.config.drain_poll_interval)
            .await;

        tracing::info!(
            final_batches = report.final_batches,
            dropped_events = report.dropped_events,
            succeeded = report.drained.succeeded,
            failed = report.drained.failed,
            "flush scheduler stopped"
        );

        report
    }

    /// Cut a batch of at most `flush_count_threshold` and start its send
    ///
    /// Always clears the flush window. Returns None if the queue was empty.
    async fn flush(&mut self, trigger: FlushTrigger) -> Option<(BatchId, usize)> {
        let events = self.queue.drain(self.config.flush_count_threshold).await;
        self.window = None;

        if events.is_empty() {
            return None;
        }

        let batch_id = self.next_batch_id;
        self.next_batch_id = batch_id.next();
        let count = events.len();

        match trigger {
            FlushTrigger::Count => self.metrics.record_count_flush(),
            FlushTrigger::Time => self.metrics.record_time_flush(),
            FlushTrigger::Shutdown => self.metrics.record_shutdown_flush(),
        }

        tracing::debug!(
            batch_id = %batch_id,
            events = count,
            trigger = %trigger,
            in_flight = self.tracker.len(),
            "flushing batch"
        );

        self.spawn_send(Batch::new(batch_id, events));
        Some((batch_id, count))
    }

    fn spawn_send(&mut self, batch: Batch) {
        let batch_id = batch.id();
        let events = batch.len();
        let sink = Arc::clone(&self.sink);
        let span = tracing::info_span!("send", batch_id = %batch_id, sink = sink.name());

        let handle = tokio::spawn(async move { sink.send(batch).await }.instrument(span));
        self.tracker.track(batch_id, events, handle);
    }
}

impl fmt::Debug for FlushScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlushScheduler")
            .field("sink", &self.sink.name())
            .field("config", &self.config)
            .field("window", &self.window)
            .field("tracker", &self.tracker)
            .finish()
    }
}
