//! Common types and utilities for sinks
//!
//! Shared functionality across all sink types.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by all sink types
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Bulk calls that returned a per-item result
    pub batches_sent: AtomicU64,

    /// Items the destination accepted
    pub events_accepted: AtomicU64,

    /// Items the destination refused
    pub events_rejected: AtomicU64,

    /// Request body bytes sent
    pub bytes_written: AtomicU64,

    /// Bulk calls that failed as a whole
    pub send_failures: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            batches_sent: AtomicU64::new(0),
            events_accepted: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
        }
    }

    /// Record a completed bulk call
    #[inline]
    pub fn record_sent(&self, accepted: u64, rejected: u64, bytes: u64) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.events_accepted.fetch_add(accepted, Ordering::Relaxed);
        self.events_rejected.fetch_add(rejected, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed bulk call
    #[inline]
    pub fn record_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_sent: u64,
    pub events_accepted: u64,
    pub events_rejected: u64,
    pub bytes_written: u64,
    pub send_failures: u64,
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
