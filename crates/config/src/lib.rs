//! Relay Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use relay_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[receiver]\nbearer_token = \"s3cret\"").unwrap();
//! ```
//!
//! # Loading for a deployment
//!
//! `Config::load` reads an optional file, applies environment overrides
//! (`BEARER_TOKEN`, `SEND_AFTER_EVENTS`, `ELASTICSEARCH_HOSTS`, ...) and only
//! then validates, so required values may come from either place.
//!
//! # Example Minimal Config
//!
//! ```toml
//! [receiver]
//! bearer_token = "s3cret"
//!
//! [sink]
//! type = "elasticsearch"
//! hosts = ["http://localhost:9200"]
//! ```

mod buffer;
mod env;
mod error;
mod logging;
mod metrics;
mod receiver;
mod sink;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use buffer::BufferConfig;
pub use env::{apply_overrides, parse_bool};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use receiver::ReceiverConfig;
pub use sink::{ElasticsearchSinkConfig, SinkConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Metrics reporting configuration
    pub metrics: MetricsConfig,

    /// Queue and flush scheduling
    pub buffer: BufferConfig,

    /// Webhook receiver
    pub receiver: ReceiverConfig,

    /// Destination sink
    pub sink: SinkConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = read_file(path.as_ref())?;
        Self::from_str(&contents)
    }

    /// Load an optional file, apply process environment overrides, validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::parse_unvalidated(&read_file(path)?)?,
            None => Self::default(),
        };
        env::apply_process_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config = Self::parse_unvalidated(s)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_unvalidated(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(ConfigError::ParseError)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}
