//! Pipeline metrics
//!
//! Atomic counters for the queue, the flush scheduler and the task tracker.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the buffering engine
///
/// Shared through an `Arc` between the queue (inserted/evicted), the
/// scheduler (flushes) and the tracker (send outcomes).
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Events accepted by `EventQueue::insert`
    events_inserted: AtomicU64,

    /// Events discarded because the queue was at capacity
    events_evicted: AtomicU64,

    /// Batches drained by the count trigger
    batches_by_count: AtomicU64,

    /// Batches drained by the time trigger
    batches_by_time: AtomicU64,

    /// Batches drained by the shutdown flush
    batches_on_shutdown: AtomicU64,

    /// Events discarded at shutdown without being sent
    events_dropped_on_shutdown: AtomicU64,

    /// Send tasks observed as succeeded
    sends_succeeded: AtomicU64,

    /// Send tasks observed as failed
    sends_failed: AtomicU64,

    /// Events in succeeded sends
    events_delivered: AtomicU64,

    /// Events in failed sends
    events_lost: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            events_inserted: AtomicU64::new(0),
            events_evicted: AtomicU64::new(0),
            batches_by_count: AtomicU64::new(0),
            batches_by_time: AtomicU64::new(0),
            batches_on_shutdown: AtomicU64::new(0),
            events_dropped_on_shutdown: AtomicU64::new(0),
            sends_succeeded: AtomicU64::new(0),
            sends_failed: AtomicU64::new(0),
            events_delivered: AtomicU64::new(0),
            events_lost: AtomicU64::new(0),
        }
    }

    /// Record an event inserted into the queue
    #[inline]
    pub fn record_inserted(&self) {
        self.events_inserted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an event evicted from the head of the queue
    #[inline]
    pub fn record_evicted(&self) {
        self.events_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch drained by the count trigger
    #[inline]
    pub fn record_count_flush(&self) {
        self.batches_by_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch drained by the time trigger
    #[inline]
    pub fn record_time_flush(&self) {
        self.batches_by_time.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch drained by the shutdown flush
    #[inline]
    pub fn record_shutdown_flush(&self) {
        self.batches_on_shutdown.fetch_add(1, Ordering::Relaxed);
    }

    /// Record events left in the queue when the scheduler stopped
    #[inline]
    pub fn record_dropped_on_shutdown(&self, events: u64) {
        self.events_dropped_on_shutdown
            .fetch_add(events, Ordering::Relaxed);
    }

    /// Record a send that completed with every item accepted
    #[inline]
    pub fn record_send_succeeded(&self, events: u64) {
        self.sends_succeeded.fetch_add(1, Ordering::Relaxed);
        self.events_delivered.fetch_add(events, Ordering::Relaxed);
    }

    /// Record a send that failed (transport error or any rejected item)
    #[inline]
    pub fn record_send_failed(&self, events: u64) {
        self.sends_failed.fetch_add(1, Ordering::Relaxed);
        self.events_lost.fetch_add(events, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    #[inline]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_inserted: self.events_inserted.load(Ordering::Relaxed),
            events_evicted: self.events_evicted.load(Ordering::Relaxed),
            batches_by_count: self.batches_by_count.load(Ordering::Relaxed),
            batches_by_time: self.batches_by_time.load(Ordering::Relaxed),
            batches_on_shutdown: self.batches_on_shutdown.load(Ordering::Relaxed),
            events_dropped_on_shutdown: self.events_dropped_on_shutdown.load(Ordering::Relaxed),
            sends_succeeded: self.sends_succeeded.load(Ordering::Relaxed),
            sends_failed: self.sends_failed.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_lost: self.events_lost.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub events_inserted: u64,
    pub events_evicted: u64,
    pub batches_by_count: u64,
    pub batches_by_time: u64,
    pub batches_on_shutdown: u64,
    pub events_dropped_on_shutdown: u64,
    pub sends_succeeded: u64,
    pub sends_failed: u64,
    pub events_delivered: u64,
    pub events_lost: u64,
}

impl MetricsSnapshot {
    /// Total batches drained by any trigger
    #[inline]
    pub fn batches_flushed(&self) -> u64 {
        self.batches_by_count + self.batches_by_time + self.batches_on_shutdown
    }

    /// Fraction of completed sends that succeeded
    ///
    /// Returns None if no send has completed yet.
    #[inline]
    pub fn send_success_rate(&self) -> Option<f64> {
        let total = self.sends_succeeded + self.sends_failed;
        if total == 0 {
            None
        } else {
            Some(self.sends_succeeded as f64 / total as f64)
        }
    }

    /// Calculate the difference from a previous snapshot
    #[inline]
    pub fn diff(&self, previous: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            events_inserted: self.events_inserted.saturating_sub(previous.events_inserted),
            events_evicted: self.events_evicted.saturating_sub(previous.events_evicted),
            batches_by_count: self.batches_by_count.saturating_sub(previous.batches_by_count),
            batches_by_time: self.batches_by_time.saturating_sub(previous.batches_by_time),
            batches_on_shutdown: self
                .batches_on_shutdown
                .saturating_sub(previous.batches_on_shutdown),
            events_dropped_on_shutdown: self
                .events_dropped_on_shutdown
                .saturating_sub(previous.events_dropped_on_shutdown),
            sends_succeeded: self.sends_succeeded.saturating_sub(previous.sends_succeeded),
            sends_failed: self.sends_failed.saturating_sub(previous.sends_failed),
            events_delivered: self.events_delivered.saturating_sub(previous.events_delivered),
            events_lost: self.events_lost.saturating_sub(previous.events_lost),
        }
    }
}

// ============================================================================
// Eviction Tracker - Rate-limited logging for queue overflow
// ============================================================================

/// Rate-limited eviction logging
///
/// Eviction is silent by contract, but operators still need to see it.
/// Evictions are aggregated and summarised at most once per second. The
/// scheduler checks every tick, so a burst is reported even when no later
/// eviction arrives, and flushes whatever is pending on shutdown.
///
/// # Thresholds
///
/// - >0 evictions/sec: WARN level
/// - >1000 evictions/sec: ERROR level (sink cannot keep up with ingest)
pub struct EvictionTracker {
    /// Evictions in current interval
    interval_evictions: AtomicU64,
    /// Last log time (epoch milliseconds)
    last_log_ms: AtomicU64,
}

/// Log interval in milliseconds
const LOG_INTERVAL_MS: u64 = 1000;

/// Evictions per interval that escalate to ERROR
const CRITICAL_EVICTION_THRESHOLD: u64 = 1000;

impl EvictionTracker {
    /// Create a new tracker
    pub fn new() -> Self {
        Self {
            interval_evictions: AtomicU64::new(0),
            last_log_ms: AtomicU64::new(Self::now_ms()),
        }
    }

    /// Record an eviction and log a summary if the interval elapsed
    #[inline]
    pub fn record_eviction(&self, capacity: usize) {
        self.interval_evictions.fetch_add(1, Ordering::Relaxed);
        self.maybe_log(capacity);
    }

    /// Log aggregated evictions if the interval has elapsed
    ///
    /// Returns true if a log line was emitted.
    pub fn maybe_log(&self, capacity: usize) -> bool {
        let now = Self::now_ms();
        let last = self.last_log_ms.load(Ordering::Relaxed);

        if now.saturating_sub(last) < LOG_INTERVAL_MS {
            return false;
        }

        if self
            .last_log_ms
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        self.emit(capacity) > 0
    }

    /// Log every pending eviction now, ignoring the interval
    ///
    /// Returns the number of evictions reported.
    pub fn flush(&self, capacity: usize) -> u64 {
        self.last_log_ms.store(Self::now_ms(), Ordering::Relaxed);
        self.emit(capacity)
    }

    fn emit(&self, capacity: usize) -> u64 {
        let evictions = self.interval_evictions.swap(0, Ordering::Relaxed);
        if evictions == 0 {
            return 0;
        }

        if evictions > CRITICAL_EVICTION_THRESHOLD {
            tracing::error!(
                evicted = evictions,
                capacity,
                threshold = CRITICAL_EVICTION_THRESHOLD,
                "CRITICAL: event queue overflowing - sink cannot keep up"
            );
        } else {
            tracing::warn!(
                evicted = evictions,
                capacity,
                "event queue full: oldest events evicted since last report"
            );
        }

        evictions
    }

    #[inline]
    fn now_ms() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Get the current eviction count (for testing)
    #[cfg(test)]
    pub fn current_evictions(&self) -> u64 {
        self.interval_evictions.load(Ordering::Relaxed)
    }

    /// Pretend the last summary was logged one interval ago
    #[cfg(test)]
    pub(crate) fn expire_interval(&self) {
        let past = Self::now_ms().saturating_sub(LOG_INTERVAL_MS);
        self.last_log_ms.store(past, Ordering::Relaxed);
    }
}

impl Default for EvictionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EvictionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvictionTracker")
            .field(
                "interval_evictions",
                &self.interval_evictions.load(Ordering::Relaxed),
            )
            .finish()
    }
}
