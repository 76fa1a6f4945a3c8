//! Status command - Check a running relay
//!
//! Calls `GET /health` on the receiver and prints the queue depth.
//!
//! # Usage
//!
//! ```bash
//! relay status
//! relay status --endpoint http://10.0.0.5:3000 --json
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

/// Status command arguments
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Receiver base URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Health response from the receiver
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    queued: usize,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let url = health_url(&args.endpoint);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error"))?;

    let body = response.text().await.context("failed to read response")?;

    if args.json {
        println!("{body}");
        return Ok(());
    }

    let health: HealthResponse =
        serde_json::from_str(&body).context("unexpected health response")?;
    println!("status: {}", health.status);
    println!("queued: {}", health.queued);
    Ok(())
}

fn health_url(endpoint: &str) -> String {
    format!("{}/health", endpoint.trim_end_matches('/'))
}
