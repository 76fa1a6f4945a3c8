//! Relay - Sources
//!
//! Network sources that receive events and insert them into the shared
//! `EventQueue`.
//!
//! # Available Sources
//!
//! - **HTTP** - Auth0 log stream webhook with bearer token authentication
//!
//! # Design Principles
//!
//! - **Never block on the sink**: a request is answered once its events are queued
//! - **Per-entry validation**: malformed entries are counted and skipped, not fatal
//! - **Constant-time auth**: the `Authorization` header is compared with `subtle`
//!
//! # Example
//!
//! ```ignore
//! use relay_sources::http::{HttpReceiver, HttpReceiverConfig};
//!
//! let queue = Arc::new(EventQueue::new(50)?);
//! let receiver = HttpReceiver::new(HttpReceiverConfig::with_token("s3cret"), queue);
//! receiver.run(cancel).await?;
//! ```

pub mod http;

pub use http::{
    HttpMetricsSnapshot, HttpReceiver, HttpReceiverConfig, HttpReceiverMetrics, HttpSourceError,
};
