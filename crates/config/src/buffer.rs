//! Buffer and flush scheduling configuration
//!
//! Mirrors the scheduler knobs: queue capacity, the two flush triggers and
//! shutdown behavior.

use serde::Deserialize;
use std::time::Duration;

/// Buffer configuration
///
/// # Example
///
/// ```toml
/// [buffer]
/// queue_capacity = 50
/// flush_count_threshold = 10
/// flush_time_threshold = "5s"
/// loop_wait = "10ms"
/// drain_poll_interval = "100ms"
/// flush_on_shutdown = true
/// shutdown_timeout = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum queued events; the oldest is evicted when full
    /// Default: 50
    pub queue_capacity: usize,

    /// Batch size cap; more queued events than this triggers a flush
    /// Default: 10
    pub flush_count_threshold: usize,

    /// Flush window age that triggers a flush
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub flush_time_threshold: Duration,

    /// Sleep between scheduler ticks
    /// Default: 10ms
    #[serde(with = "humantime_serde")]
    pub loop_wait: Duration,

    /// Sleep between polls while draining in-flight sends
    /// Default: 100ms
    #[serde(with = "humantime_serde")]
    pub drain_poll_interval: Duration,

    /// Send whatever is still queued when stopping
    /// Default: true
    pub flush_on_shutdown: bool,

    /// How long the process waits for in-flight sends on shutdown
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 50,
            flush_count_threshold: 10,
            flush_time_threshold: Duration::from_secs(5),
            loop_wait: Duration::from_millis(10),
            drain_poll_interval: Duration::from_millis(100),
            flush_on_shutdown: true,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}
