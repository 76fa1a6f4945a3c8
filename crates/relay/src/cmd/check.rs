//! Check command - Validate configuration
//!
//! Loads the config file (if any), applies environment overrides, validates
//! the result and prints what `serve` would run with. Secrets are masked.
//!
//! # Usage
//!
//! ```bash
//! relay check --config configs/relay.toml
//! BEARER_TOKEN=s3cret relay check
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use relay_config::{Config, SinkConfig};

/// Run the check command
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = Config::load(path).context("configuration is invalid")?;

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults + environment)".to_string());
    println!("configuration OK: {source}");
    for line in summary(&config) {
        println!("  {line}");
    }

    Ok(())
}

/// One line per setting group
fn summary(config: &Config) -> Vec<String> {
    let buffer = &config.buffer;
    let receiver = &config.receiver;

    let mut lines = vec![
        format!(
            "buffer: capacity {} | flush after {} events or {:?} | loop wait {:?} | flush on shutdown {}",
            buffer.queue_capacity,
            buffer.flush_count_threshold,
            buffer.flush_time_threshold,
            buffer.loop_wait,
            buffer.flush_on_shutdown,
        ),
        if receiver.enabled {
            format!(
                "receiver: {}:{} | token {} | max payload {} bytes",
                receiver.address,
                receiver.port,
                mask(&receiver.bearer_token),
                receiver.max_payload_size,
            )
        } else {
            "receiver: disabled".to_string()
        },
    ];

    lines.push(match &config.sink {
        SinkConfig::Elasticsearch(es) => format!(
            "sink: elasticsearch | hosts {} | index {} | auth {} | verify tls {}",
            es.hosts.join(","),
            es.index,
            es.username.as_deref().unwrap_or("none"),
            es.verify_tls,
        ),
        other => format!("sink: {}", other.type_name()),
    });

    lines.push(format!(
        "log: {} ({:?} to {:?})",
        config.log.level.as_str(),
        config.log.format,
        config.log.output,
    ));

    lines
}

fn mask(secret: &str) -> String {
    match secret.chars().count() {
        0 => "(unset)".to_string(),
        n => "*".repeat(n.min(8)),
    }
}
