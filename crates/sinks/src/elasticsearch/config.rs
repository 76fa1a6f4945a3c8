//! Elasticsearch sink configuration

use std::time::Duration;

use relay_pipeline::SinkError;

use super::bulk::validate_index_pattern;

// =============================================================================
// Constants
// =============================================================================

/// Default cluster address
pub const DEFAULT_HOST: &str = "http://localhost:9200";

/// Default index name pattern (strftime, UTC)
pub const DEFAULT_INDEX_PATTERN: &str = "auth0-events-%Y.%m.%d";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Elasticsearch sink
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URLs of cluster nodes, used round-robin
    pub hosts: Vec<String>,

    /// Index name pattern, rendered with the send time
    pub index: String,

    /// Username for basic auth (optional)
    pub username: Option<String>,

    /// Password for basic auth (optional)
    pub password: Option<String>,

    /// Verify server TLS certificates
    pub verify_tls: bool,

    /// Timeout for a single bulk request
    pub request_timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            hosts: vec![DEFAULT_HOST.into()],
            index: DEFAULT_INDEX_PATTERN.into(),
            username: None,
            password: None,
            verify_tls: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ElasticsearchConfig {
    /// Replace the host list
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the index name pattern
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Enable or disable certificate verification
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the configuration before building a client
    pub fn validate(&self) -> Result<(), SinkError> {
        if self.hosts.is_empty() {
            return Err(SinkError::config("at least one host is required"));
        }
        if let Some(host) = self
            .hosts
            .iter()
            .find(|h| !(h.starts_with("http://") || h.starts_with("https://")))
        {
            return Err(SinkError::config(format!(
                "host '{host}' must start with http:// or https://"
            )));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(SinkError::config(
                "username and password must be set together",
            ));
        }
        validate_index_pattern(&self.index)
    }
}
