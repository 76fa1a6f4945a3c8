//! Configuration validation
//!
//! Validates config consistency:
//! - Buffer thresholds and intervals are non-zero
//! - The receiver has a bearer token when enabled
//! - The Elasticsearch sink has usable hosts and paired credentials

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::sink::{ElasticsearchSinkConfig, SinkConfig};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_buffer(config)?;
    validate_receiver(config)?;
    validate_sink(config)?;
    Ok(())
}

fn validate_buffer(config: &Config) -> Result<()> {
    let buffer = &config.buffer;

    if buffer.queue_capacity == 0 {
        return Err(positive("queue_capacity"));
    }
    if buffer.flush_count_threshold == 0 {
        return Err(positive("flush_count_threshold"));
    }

    for (field, value) in [
        ("flush_time_threshold", buffer.flush_time_threshold),
        ("loop_wait", buffer.loop_wait),
        ("drain_poll_interval", buffer.drain_poll_interval),
    ] {
        if value == Duration::ZERO {
            return Err(positive(field));
        }
    }

    Ok(())
}

fn validate_receiver(config: &Config) -> Result<()> {
    let receiver = &config.receiver;
    if !receiver.enabled {
        return Ok(());
    }

    if receiver.bearer_token.trim().is_empty() {
        return Err(ConfigError::missing_field("receiver", "http", "bearer_token"));
    }
    if receiver.max_payload_size == 0 {
        return Err(ConfigError::invalid_value(
            "receiver",
            "http",
            "max_payload_size",
            "must be greater than zero",
        ));
    }
    if receiver.id_field.is_empty() {
        return Err(ConfigError::missing_field("receiver", "http", "id_field"));
    }

    Ok(())
}

fn validate_sink(config: &Config) -> Result<()> {
    match &config.sink {
        SinkConfig::Elasticsearch(es) => validate_elasticsearch(es),
        // Null and Stdout don't have required fields
        SinkConfig::Null | SinkConfig::Stdout => Ok(()),
    }
}

fn validate_elasticsearch(es: &ElasticsearchSinkConfig) -> Result<()> {
    if es.hosts.is_empty() {
        return Err(ConfigError::missing_field("sink", "elasticsearch", "hosts"));
    }

    for host in &es.hosts {
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "sink",
                "elasticsearch",
                "hosts",
                format!("'{host}' must start with http:// or https://"),
            ));
        }
    }

    if es.index.trim().is_empty() {
        return Err(ConfigError::missing_field("sink", "elasticsearch", "index"));
    }

    match (&es.username, &es.password) {
        (Some(_), None) => Err(ConfigError::missing_field(
            "sink",
            "elasticsearch",
            "password",
        )),
        (None, Some(_)) => Err(ConfigError::missing_field(
            "sink",
            "elasticsearch",
            "username",
        )),
        _ => Ok(()),
    }
}

fn positive(field: &'static str) -> ConfigError {
    ConfigError::invalid_value("buffer", "buffer", field, "must be greater than zero")
}
