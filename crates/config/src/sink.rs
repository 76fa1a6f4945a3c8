//! Sink configuration types
//!
//! A single destination receives every flushed batch. The type is selected
//! with the `type` key; Elasticsearch is the default.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the destination sink
///
/// # Example
///
/// ```toml
/// [sink]
/// type = "elasticsearch"
/// hosts = ["http://es-1:9200", "http://es-2:9200"]
/// index = "auth0-events-%Y.%m.%d"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Elasticsearch bulk API
    Elasticsearch(ElasticsearchSinkConfig),

    /// Null sink - accepts and discards everything
    Null,

    /// Stdout sink - one JSON line per event
    Stdout,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Elasticsearch(ElasticsearchSinkConfig::default())
    }
}

impl SinkConfig {
    /// Get the sink type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Elasticsearch(_) => "elasticsearch",
            Self::Null => "null",
            Self::Stdout => "stdout",
        }
    }

    /// Elasticsearch settings, if that is the configured sink
    pub fn elasticsearch(&self) -> Option<&ElasticsearchSinkConfig> {
        match self {
            Self::Elasticsearch(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable Elasticsearch settings, if that is the configured sink
    pub fn elasticsearch_mut(&mut self) -> Option<&mut ElasticsearchSinkConfig> {
        match self {
            Self::Elasticsearch(c) => Some(c),
            _ => None,
        }
    }
}

/// Elasticsearch sink configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticsearchSinkConfig {
    /// Cluster base URLs, used round-robin
    /// Default: ["http://localhost:9200"]
    pub hosts: Vec<String>,

    /// Index name pattern (chrono strftime, rendered in UTC per send)
    /// Default: "auth0-events-%Y.%m.%d"
    pub index: String,

    /// Basic auth user
    pub username: Option<String>,

    /// Basic auth password
    pub password: Option<String>,

    /// Verify server certificates
    /// Default: true
    pub verify_tls: bool,

    /// Timeout for one bulk request
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ElasticsearchSinkConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["http://localhost:9200".into()],
            index: "auth0-events-%Y.%m.%d".into(),
            username: None,
            password: None,
            verify_tls: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}
