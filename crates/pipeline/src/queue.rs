//! EventQueue - bounded FIFO buffer between the receiver and the scheduler
//!
//! Every read and write goes through one async mutex, so `size()` never
//! races a concurrent `insert()`/`drain()`. At capacity an insert evicts
//! the oldest event instead of blocking the caller.

use std::collections::VecDeque;
use std::sync::Arc;

use relay_protocol::Event;
use tokio::sync::Mutex;

use crate::error::{PipelineError, Result};
use crate::metrics::{EvictionTracker, PipelineMetrics};

/// Bounded FIFO queue of pending events
///
/// # Invariants
///
/// - `size() <= capacity()` at all times
/// - `drain(n)` returns a prefix of the queue in insertion order
///
/// # Example
///
/// ```ignore
/// let queue = EventQueue::new(50)?;
/// queue.insert(Event::new("a", json!({}))).await;
/// let batch = queue.drain(10).await;
/// ```
pub struct EventQueue {
    /// Backing store, never exposed outside the guard
    events: Mutex<VecDeque<Event>>,

    /// Maximum number of retained events
    capacity: usize,

    /// Shared pipeline counters
    metrics: Arc<PipelineMetrics>,

    /// Rate-limited overflow logging
    evictions: EvictionTracker,
}

impl EventQueue {
    /// Create a queue with its own metrics
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_metrics(capacity, Arc::new(PipelineMetrics::new()))
    }

    /// Create a queue recording into the given metrics
    pub fn with_metrics(capacity: usize, metrics: Arc<PipelineMetrics>) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity);
        }

        Ok(Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            metrics,
            evictions: EvictionTracker::new(),
        })
    }

    /// Maximum number of events the queue retains
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shared metrics handle
    #[inline]
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Append an event at the tail
    ///
    /// If the queue is full the head event is dropped first and returned.
    /// Never fails.
    pub async fn insert(&self, event: Event) -> Option<Event> {
        let mut events = self.events.lock().await;
        let evicted = self.push_bounded(&mut events, event);
        drop(events);

        if evicted.is_some() {
            self.evictions.record_eviction(self.capacity);
        }
        evicted
    }

    /// Append several events under a single lock acquisition
    ///
    /// Returns the number of events evicted to make room.
    pub async fn insert_many<I>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = Event>,
    {
        let mut events = self.events.lock().await;
        let mut evicted = 0;
        for event in batch {
            if self.push_bounded(&mut events, event).is_some() {
                evicted += 1;
            }
        }
        drop(events);

        for _ in 0..evicted {
            self.evictions.record_eviction(self.capacity);
        }
        evicted
    }

    /// Log evictions pending since the last summary, rate-limited
    pub fn report_evictions(&self) -> bool {
        self.evictions.maybe_log(self.capacity)
    }

    /// Log every pending eviction immediately
    pub fn flush_eviction_report(&self) -> u64 {
        self.evictions.flush(self.capacity)
    }

    #[cfg(test)]
    pub(crate) fn eviction_tracker(&self) -> &EvictionTracker {
        &self.evictions
    }

    /// Remove and return up to `n` events from the head, in FIFO order
    ///
    /// Returns an empty vector when the queue is empty.
    pub async fn drain(&self, n: usize) -> Vec<Event> {
        let mut events = self.events.lock().await;
        let take = n.min(events.len());
        events.drain(..take).collect()
    }

    /// Number of queued events
    pub async fn size(&self) -> usize {
        self.events.lock().await.len()
    }

    /// Check if no events are queued
    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    fn push_bounded(&self, events: &mut VecDeque<Event>, event: Event) -> Option<Event> {
        let evicted = if events.len() >= self.capacity {
            self.metrics.record_evicted();
            events.pop_front()
        } else {
            None
        };

        events.push_back(event);
        self.metrics.record_inserted();
        evicted
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("capacity", &self.capacity)
            .field("evictions", &self.evictions)
            .finish_non_exhaustive()
    }
}
