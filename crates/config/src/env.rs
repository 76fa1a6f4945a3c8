//! Environment variable overrides
//!
//! Each variable, when set, replaces the corresponding file value.
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `BEARER_TOKEN` | `receiver.bearer_token` |
//! | `BIND_ADDRESS` | `receiver.address` |
//! | `BIND_PORT` | `receiver.port` |
//! | `QUEUE_MAX_SIZE` | `buffer.queue_capacity` |
//! | `SEND_AFTER_EVENTS` | `buffer.flush_count_threshold` |
//! | `SEND_AFTER_TIME` | `buffer.flush_time_threshold` (whole seconds) |
//! | `SEND_LOOP_WAIT` | `buffer.loop_wait` (seconds, fractional) |
//! | `ELASTICSEARCH_HOSTS` | `sink.hosts` (comma separated) |
//! | `ELASTICSEARCH_URL` | `sink.hosts`, when `ELASTICSEARCH_HOSTS` is unset |
//! | `ELASTICSEARCH_INDEX_NAME` | `sink.index` |
//! | `ELASTICSEARCH_USERNAME` | `sink.username` |
//! | `ELASTICSEARCH_PASSWORD` | `sink.password` |
//! | `ELASTICSEARCH_SSL_VERIFY` | `sink.verify_tls` |
//! | `LOG_LEVEL` | `log.level` |
//!
//! `ELASTICSEARCH_*` variables only apply when the sink is Elasticsearch.

use std::str::FromStr;
use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::logging::LogLevel;

/// Apply overrides from the process environment
pub fn apply_process_env(config: &mut Config) -> Result<()> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides using `lookup` to read variables
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("BEARER_TOKEN") {
        config.receiver.bearer_token = token;
    }
    if let Some(address) = lookup("BIND_ADDRESS") {
        config.receiver.address = address;
    }
    if let Some(port) = lookup("BIND_PORT") {
        config.receiver.port = parse_number("BIND_PORT", &port)?;
    }

    if let Some(size) = lookup("QUEUE_MAX_SIZE") {
        config.buffer.queue_capacity = parse_number("QUEUE_MAX_SIZE", &size)?;
    }
    if let Some(events) = lookup("SEND_AFTER_EVENTS") {
        config.buffer.flush_count_threshold = parse_number("SEND_AFTER_EVENTS", &events)?;
    }
    if let Some(secs) = lookup("SEND_AFTER_TIME") {
        config.buffer.flush_time_threshold =
            Duration::from_secs(parse_number("SEND_AFTER_TIME", &secs)?);
    }
    if let Some(secs) = lookup("SEND_LOOP_WAIT") {
        config.buffer.loop_wait = parse_seconds("SEND_LOOP_WAIT", &secs)?;
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.log.level = LogLevel::from_str(&level)
            .map_err(|e| ConfigError::invalid_env("LOG_LEVEL", &level, e))?;
    }

    let Some(es) = config.sink.elasticsearch_mut() else {
        return Ok(());
    };

    if let Some(hosts) = lookup("ELASTICSEARCH_HOSTS").or_else(|| lookup("ELASTICSEARCH_URL")) {
        es.hosts = split_hosts(&hosts);
    }
    if let Some(index) = lookup("ELASTICSEARCH_INDEX_NAME") {
        es.index = index;
    }
    if let Some(username) = lookup("ELASTICSEARCH_USERNAME") {
        es.username = Some(username);
    }
    if let Some(password) = lookup("ELASTICSEARCH_PASSWORD") {
        es.password = Some(password);
    }
    if let Some(verify) = lookup("ELASTICSEARCH_SSL_VERIFY") {
        es.verify_tls = parse_bool(&verify).ok_or_else(|| {
            ConfigError::invalid_env("ELASTICSEARCH_SSL_VERIFY", &verify, "expected a boolean")
        })?;
    }

    Ok(())
}

/// Parse a boolean the way the webhook deployment scripts spell them
///
/// Accepts `t/true/yes/y/1` and `f/false/no/n/0`, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "yes" | "y" | "1" => Some(true),
        "f" | "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid_env(var, value, e.to_string()))
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration> {
    let secs: f64 = parse_number(var, value)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ConfigError::invalid_env(var, value, e.to_string()))
}

fn split_hosts(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}
