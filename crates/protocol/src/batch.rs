//! Batch - events drained together for a single bulk send
//!
//! A `Batch` is created by the flush scheduler from a prefix of the event
//! queue. Once built it is handed to exactly one send task and never goes
//! back into the queue.

use std::fmt;

use crate::event::{Event, EventId};

/// Monotonic batch sequence number assigned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BatchId(u64);

impl BatchId {
    /// Create a batch ID from a raw sequence number
    #[inline]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Get the raw sequence number
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Next ID in sequence
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

/// Ordered group of events, in queue (FIFO) order
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    id: BatchId,
    events: Vec<Event>,
}

impl Batch {
    /// Create a batch from already-drained events
    pub fn new(id: BatchId, events: Vec<Event>) -> Self {
        Self { id, events }
    }

    /// Get the batch ID
    #[inline]
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Number of events in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the batch holds no events
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in insertion order
    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate over event identifiers in order
    pub fn ids(&self) -> impl Iterator<Item = &EventId> {
        self.events.iter().map(Event::id)
    }

    /// Consume the batch, returning its events
    #[inline]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
