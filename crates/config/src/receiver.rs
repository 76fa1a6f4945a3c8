//! HTTP receiver configuration

use serde::Deserialize;

/// HTTP receiver configuration
///
/// # Example
///
/// ```toml
/// [receiver]
/// address = "0.0.0.0"
/// port = 3000
/// bearer_token = "s3cret"
/// max_payload_size = 16777216
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Whether the webhook receiver runs
    /// Default: true
    pub enabled: bool,

    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port
    /// Default: 3000
    pub port: u16,

    /// Token expected in `Authorization: Bearer <token>`
    /// Required when enabled
    pub bearer_token: String,

    /// Maximum request body in bytes
    /// Default: 16MB
    pub max_payload_size: usize,

    /// Field of each log entry used as the event identifier
    /// Default: "log_id"
    pub id_field: String,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: "0.0.0.0".into(),
            port: 3000,
            bearer_token: String::new(),
            max_payload_size: 16 * 1024 * 1024,
            id_field: "log_id".into(),
        }
    }
}
