//! Relay - Auth0 log stream to Elasticsearch bridge
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! relay
//! relay --config configs/relay.toml
//!
//! # Validate configuration (file + environment) and exit
//! relay check --config configs/relay.toml
//!
//! # Ask a running instance for its health
//! relay status --endpoint http://127.0.0.1:3000
//! ```

mod cmd;
mod reporter;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Default config locations tried when `--config` is not given
const DEFAULT_CONFIG_PATHS: &[&str] = &["configs/relay.toml", "relay.toml"];

/// Relay - buffers webhook events and bulk-writes them to Elasticsearch
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config and LOG_LEVEL.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server
    Serve,

    /// Load and validate configuration, then print a summary
    Check,

    /// Query the health endpoint of a running instance
    Status(cmd::status::StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Check) => {
            let path = resolve_config_path(cli.config);
            cmd::check::run(path.as_deref())
        }
        Some(Command::Status(args)) => {
            // Status doesn't need logging - just outputs to stdout
            cmd::status::run(args).await
        }
        // No subcommand = run server (default behavior)
        Some(Command::Serve) | None => {
            let path = resolve_config_path(cli.config);
            let config = Config::load(path.as_deref()).context("failed to load configuration")?;
            init_logging(&config.log, cli.log_level.as_deref())?;
            cmd::serve::run(config, path).await
        }
    }
}

/// Explicit path wins; otherwise the first default path that exists
fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
    })
}

/// Initialize the tracing subscriber for logging
///
/// Level: CLI flag > config (`[log].level` or `LOG_LEVEL`) > info.
fn init_logging(log: &LogConfig, cli_level: Option<&str>) -> Result<()> {
    let level = cli_level.unwrap_or(log.level.as_str());
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match log.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = match log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(())
}
