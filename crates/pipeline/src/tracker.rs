//! TaskTracker - reconciles in-flight sends
//!
//! Sends are spawned and never awaited in-line. Each scheduler tick calls
//! `poll()`, which collects the finished tasks without blocking and keeps
//! the rest for the next tick. The tracked set is owned by the scheduler,
//! so it needs no lock of its own.

use std::sync::Arc;
use std::time::Duration;

use relay_protocol::{BatchId, BulkResponse};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::failure::{SendFailure, classify};
use crate::metrics::PipelineMetrics;
use crate::sink::SinkError;

/// One outstanding sink call
#[derive(Debug)]
pub struct SendTask {
    batch_id: BatchId,
    events: usize,
    started: Instant,
    handle: JoinHandle<Result<BulkResponse, SinkError>>,
}

impl SendTask {
    /// Batch being sent
    #[inline]
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    /// Number of events in the batch
    #[inline]
    pub fn events(&self) -> usize {
        self.events
    }
}

/// A send observed as finished
#[derive(Debug)]
pub struct Completion {
    pub batch_id: BatchId,
    pub events: usize,
    pub elapsed: Duration,
    pub result: Result<BulkResponse, SendFailure>,
}

impl Completion {
    /// Check if every item was accepted
    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of one `poll()`
#[derive(Debug, Default)]
pub struct PollSummary {
    /// Sends that finished during this poll, in tracking order
    pub completed: Vec<Completion>,
    /// Sends still in flight
    pub pending: usize,
}

impl PollSummary {
    /// Sends that finished successfully
    pub fn succeeded(&self) -> usize {
        self.completed.iter().filter(|c| c.is_success()).count()
    }

    /// Sends that finished with a failure
    pub fn failed(&self) -> usize {
        self.completed.len() - self.succeeded()
    }
}

/// Totals from `drain_blocking()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub polls: usize,
}

/// Set of outstanding send tasks
pub struct TaskTracker {
    tasks: Vec<SendTask>,
    metrics: Arc<PipelineMetrics>,
}

impl TaskTracker {
    /// Create an empty tracker recording into `metrics`
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            tasks: Vec::new(),
            metrics,
        }
    }

    /// Start tracking a spawned send
    pub fn track(
        &mut self,
        batch_id: BatchId,
        events: usize,
        handle: JoinHandle<Result<BulkResponse, SinkError>>,
    ) {
        self.tasks.push(SendTask {
            batch_id,
            events,
            started: Instant::now(),
            handle,
        });
    }

    /// Number of sends in flight
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if no sends are in flight
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Outstanding tasks, oldest first
    #[inline]
    pub fn tasks(&self) -> &[SendTask] {
        &self.tasks
    }

    /// Reconcile finished sends without waiting on unfinished ones
    ///
    /// Finished tasks are removed and recorded as succeeded or failed.
    /// Failures are logged with every rejected item and never retried.
    pub async fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();
        if self.tasks.is_empty() {
            return summary;
        }

        let mut still_pending = Vec::with_capacity(self.tasks.len());
        for task in std::mem::take(&mut self.tasks) {
            if !task.handle.is_finished() {
                still_pending.push(task);
                continue;
            }

            // Finished handles resolve immediately
            let joined = task.handle.await;
            let completion = Completion {
                batch_id: task.batch_id,
                events: task.events,
                elapsed: task.started.elapsed(),
                result: classify(joined, task.events),
            };
            self.record(&completion);
            summary.completed.push(completion);
        }

        self.tasks = still_pending;
        summary.pending = self.tasks.len();
        summary
    }

    /// Poll until no sends remain, sleeping `interval` between polls
    ///
    /// Returns immediately when nothing is outstanding. There is no
    /// timeout: a send that never finishes blocks this forever, so callers
    /// that need bounded shutdown must wrap it.
    pub async fn drain_blocking(&mut self, interval: Duration) -> DrainSummary {
        let mut drained = DrainSummary::default();
        if self.tasks.is_empty() {
            return drained;
        }

        tracing::info!(
            pending = self.tasks.len(),
            "waiting for pending send tasks to complete"
        );

        loop {
            let summary = self.poll().await;
            drained.polls += 1;
            drained.succeeded += summary.succeeded();
            drained.failed += summary.failed();

            if self.tasks.is_empty() {
                break;
            }

            tracing::debug!(remaining = self.tasks.len(), "send tasks still pending");
            tokio::time::sleep(interval).await;
        }

        tracing::info!(
            succeeded = drained.succeeded,
            failed = drained.failed,
            "all send tasks completed"
        );

        drained
    }

    fn record(&self, completion: &Completion) {
        let events = completion.events as u64;
        match &completion.result {
            Ok(_) => {
                self.metrics.record_send_succeeded(events);
                tracing::debug!(
                    batch_id = %completion.batch_id,
                    events = completion.events,
                    elapsed_ms = completion.elapsed.as_millis() as u64,
                    "batch sent"
                );
            }
            Err(failure) => {
                self.metrics.record_send_failed(events);
                tracing::error!(
                    batch_id = %completion.batch_id,
                    events = completion.events,
                    kind = failure.kind(),
                    error = %failure,
                    "batch send failed, events dropped"
                );
                for rejection in failure.rejections() {
                    tracing::warn!(
                        batch_id = %completion.batch_id,
                        event_id = %rejection.id,
                        code = %rejection.code,
                        reason = %rejection.reason,
                        "event rejected by sink"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTracker")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
