//! Relay - Sinks
//!
//! Bulk-write destinations for batches cut by the flush scheduler.
//!
//! # Architecture
//!
//! Every sink implements `relay_pipeline::SinkClient`. The scheduler spawns
//! one `send` per batch and reconciles the per-item results itself, so
//! sinks never retry and never block the flush loop.
//!
//! ```text
//! [FlushScheduler] --spawn--> SinkClient::send(Batch) --> [Destination]
//!                                     |
//!                                     v
//!                              BulkResponse (per item)
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `elasticsearch` | Bulk indexing over HTTP |
//! | `null` | Benchmarking (discard all) |
//! | `stdout` | Debug output (JSON lines) |

/// Elasticsearch sink - bulk API over HTTP
pub mod elasticsearch;

/// Null sink - discards all data (for benchmarking)
pub mod null;

/// Stdout sink - JSON lines debug output
pub mod stdout;

/// Common types shared by all sinks (metrics)
mod common;

pub use common::{MetricsSnapshot, SinkMetrics};
pub use relay_pipeline::{SinkClient, SinkError};

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchSink};
pub use null::NullSink;
pub use stdout::StdoutSink;
