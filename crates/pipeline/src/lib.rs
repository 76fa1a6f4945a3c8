//! Relay - Pipeline
//!
//! The buffering and flush-scheduling engine between the receiver and the
//! sink.
//!
//! # Architecture
//!
//! ```text
//! [Receiver] ──insert──→ EventQueue ──drain──→ FlushScheduler ──spawn──→ SinkClient::send
//!                        (bounded,            (count / time               │
//!                         evict oldest)        trigger)                   ▼
//!                                                    ▲              TaskTracker
//!                                                    └──── poll ─────┘
//! ```
//!
//! # Key Design
//!
//! - **Bounded memory**: the queue evicts its oldest event instead of blocking
//! - **Dual trigger**: a batch is cut when more than `flush_count_threshold`
//!   events wait, or when the flush window is older than `flush_time_threshold`
//! - **Non-blocking sends**: each batch is sent on its own task; the loop only polls
//! - **No retry**: any rejected item fails the batch, which is logged and dropped
//! - **Graceful drain**: on stop, in-flight sends are polled until none remain
//!
//! # Example
//!
//! ```ignore
//! use relay_pipeline::{EventQueue, FlushScheduler, SchedulerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let queue = Arc::new(EventQueue::new(50)?);
//! let scheduler = FlushScheduler::new(Arc::clone(&queue), sink, SchedulerConfig::default())?;
//!
//! let cancel = CancellationToken::new();
//! let handle = tokio::spawn(scheduler.run(cancel.clone()));
//!
//! queue.insert(event).await;
//!
//! cancel.cancel();
//! let report = handle.await?;
//! ```

mod error;
mod failure;
mod metrics;
mod queue;
mod scheduler;
mod sink;
mod tracker;

pub use error::{PipelineError, Result};
pub use failure::{ItemRejection, SendFailure, classify, classify_response};
pub use metrics::{EvictionTracker, MetricsSnapshot, PipelineMetrics};
pub use queue::EventQueue;
pub use scheduler::{
    DEFAULT_DRAIN_POLL_INTERVAL, DEFAULT_FLUSH_COUNT_THRESHOLD, DEFAULT_FLUSH_TIME_THRESHOLD,
    DEFAULT_LOOP_WAIT, FlushScheduler, FlushTrigger, SchedulerConfig, ShutdownReport, TickOutcome,
    evaluate_trigger,
};
pub use sink::{SinkClient, SinkError};
pub use tracker::{Completion, DrainSummary, PollSummary, SendTask, TaskTracker};

// Re-export key types from dependencies for convenience
pub use relay_protocol::{Batch, BatchId, BulkResponse, Event, EventId, ItemOutcome, ItemResult};

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

#[cfg(test)]
mod test_util;



#[cfg(test)]
#[path = "tracker_test.rs"]
mod tracker_test;

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
