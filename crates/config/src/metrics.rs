//! Metrics reporting configuration
//!
//! Controls how Relay reports internal counters.
//!
//! # Defaults
//!
//! - `enabled`: true
//! - `interval`: 60s
//! - `format`: human
//! - All include flags: true

use serde::Deserialize;
use std::time::Duration;

/// Metrics output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON structured output
    Json,
}

/// Metrics configuration
///
/// # Example
///
/// ```toml
/// [metrics]
/// enabled = true
/// interval = "60s"
/// format = "human"
/// include_pipeline = true
/// include_receiver = true
/// include_sink = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable periodic metrics reporting
    /// Default: true
    pub enabled: bool,

    /// Reporting interval
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Output format (human, json)
    /// Default: human
    pub format: MetricsFormat,

    /// Include queue and scheduler counters
    pub include_pipeline: bool,

    /// Include HTTP receiver counters
    pub include_receiver: bool,

    /// Include sink counters
    pub include_sink: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            format: MetricsFormat::Human,
            include_pipeline: true,
            include_receiver: true,
            include_sink: true,
        }
    }
}
