//! HTTP receiver configuration

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default maximum payload size (16MB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Field holding the event identifier in each log entry
pub const DEFAULT_ID_FIELD: &str = "log_id";

/// HTTP receiver configuration
#[derive(Debug, Clone)]
pub struct HttpReceiverConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Token expected in `Authorization: Bearer <token>`
    pub bearer_token: String,

    /// Maximum request payload size in bytes
    pub max_payload_size: usize,

    /// Field used as the event identifier
    pub id_field: String,
}

impl Default for HttpReceiverConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            bearer_token: String::new(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            id_field: DEFAULT_ID_FIELD.into(),
        }
    }
}

impl HttpReceiverConfig {
    /// Create config with the given bearer token and default bind settings
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            bearer_token: token.into(),
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
