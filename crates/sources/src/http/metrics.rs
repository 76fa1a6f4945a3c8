//! HTTP receiver metrics
//!
//! Atomic counters for tracking webhook ingestion.

use std::sync::atomic::{AtomicU64, Ordering};

/// HTTP receiver metrics
#[derive(Debug, Default)]
pub struct HttpReceiverMetrics {
    /// Total HTTP requests received
    pub requests_total: AtomicU64,

    /// Successful requests (2xx)
    pub requests_success: AtomicU64,

    /// Client errors (4xx)
    pub requests_client_error: AtomicU64,

    /// Authentication failures
    pub auth_failures: AtomicU64,

    /// Events inserted into the queue
    pub events_accepted: AtomicU64,

    /// Log entries that could not become events
    pub events_rejected: AtomicU64,

    /// Queued events evicted to make room for this receiver's inserts
    pub events_evicted: AtomicU64,

    /// Request body bytes received
    pub bytes_received: AtomicU64,
}

impl HttpReceiverMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            requests_client_error: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            events_accepted: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            events_evicted: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
        }
    }

    /// Record a request received
    #[inline]
    pub fn request_received(&self, bytes: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a successful request
    #[inline]
    pub fn request_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a client error (4xx)
    #[inline]
    pub fn request_client_error(&self) {
        self.requests_client_error.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an authentication failure
    #[inline]
    pub fn auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
        self.request_client_error();
    }

    /// Record the outcome of one request's log entries
    #[inline]
    pub fn events_processed(&self, accepted: usize, rejected: usize, evicted: usize) {
        self.events_accepted
            .fetch_add(accepted as u64, Ordering::Relaxed);
        self.events_rejected
            .fetch_add(rejected as u64, Ordering::Relaxed);
        self.events_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_client_error: self.requests_client_error.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            events_evicted: self.events_evicted.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of receiver metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_client_error: u64,
    pub auth_failures: u64,
    pub events_accepted: u64,
    pub events_rejected: u64,
    pub events_evicted: u64,
    pub bytes_received: u64,
}
