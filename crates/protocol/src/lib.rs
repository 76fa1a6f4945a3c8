//! Relay Protocol - Core types that flow through the buffer
//!
//! This crate provides the foundational types shared by the receiver, the
//! buffering engine and the sinks:
//! - `Event` - An immutable record with a caller-supplied stable identifier
//! - `Batch` - An ordered group of events drained together for one send
//! - `BulkResponse` - Per-item outcome of a bulk write
//!
//! # Design Principles
//!
//! - **Caller-supplied identity**: `EventId` comes from the record, never generated
//! - **Immutable once built**: events expose read-only accessors
//! - **Sink agnostic**: bulk outcomes carry an error category and reason, not a wire format

mod batch;
mod bulk;
mod error;
mod event;

pub use batch::{Batch, BatchId};
pub use bulk::{BulkResponse, ItemOutcome, ItemResult};
pub use error::ProtocolError;
pub use event::{Event, EventId};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
