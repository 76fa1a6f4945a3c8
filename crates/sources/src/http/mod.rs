//! HTTP Receiver - Auth0 log stream webhook
//!
//! Accepts log stream deliveries over HTTP and inserts each entry into the
//! shared `EventQueue`. The receiver never waits on the sink: once events
//! are queued the call is answered.
//!
//! # Endpoints
//!
//! - `POST /` - Receive log entries
//! - `GET /health` - Health check
//!
//! # Protocol
//!
//! ```text
//! POST /
//! Content-Type: application/json
//! Authorization: Bearer <token>
//!
//! {"logs":[{"log_id":"90020230101","data":{"type":"s","user_id":"auth0|123"}}]}
//! ```
//!
//! | Condition | Status |
//! |-----------|--------|
//! | Missing or wrong token | 403 |
//! | Empty body | 400 |
//! | Body not a JSON object | 422 |
//! | Body over `max_payload_size` | 413 |
//! | Otherwise | 200 `{"message":"Received!","accepted":n,"rejected":m}` |
//!
//! # Example
//!
//! ```ignore
//! use relay_sources::http::{HttpReceiver, HttpReceiverConfig};
//!
//! let config = HttpReceiverConfig::with_token("s3cret");
//! let receiver = HttpReceiver::new(config, Arc::clone(&queue));
//! receiver.run(cancel_token).await?;
//! ```

mod auth;
mod config;
mod error;
mod handlers;
mod log_types;
mod metrics;
mod response;


use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use relay_pipeline::EventQueue;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use config::{DEFAULT_ID_FIELD, DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_PORT, HttpReceiverConfig};
pub use error::HttpSourceError;
pub use log_types::{UNKNOWN_EVENT_TYPE, describe as describe_log_type, enrich};
pub use metrics::{HttpMetricsSnapshot, HttpReceiverMetrics};
pub use response::RECEIVED_MESSAGE;

use auth::expected_header;
use handlers::{HandlerState, health_check, receive_logs};

/// HTTP receiver feeding the event queue
pub struct HttpReceiver {
    config: HttpReceiverConfig,
    queue: Arc<EventQueue>,
    metrics: Arc<HttpReceiverMetrics>,
}

impl HttpReceiver {
    /// Create a new receiver inserting into `queue`
    pub fn new(config: HttpReceiverConfig, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            queue,
            metrics: Arc::new(HttpReceiverMetrics::new()),
        }
    }

    /// Shared metrics handle; remains valid after `run()` consumes the receiver
    pub fn metrics(&self) -> Arc<HttpReceiverMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Build the axum router without binding
    pub fn router(&self) -> Router {
        build_router(self.handler_state(), self.config.max_payload_size)
    }

    /// Bind to the configured address and serve until cancelled
    pub async fn run(self, cancel: CancellationToken) -> Result<(), HttpSourceError> {
        let bind_addr = self.config.bind_address();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| HttpSourceError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;

        self.serve(listener, cancel).await
    }

    /// Serve on an already bound listener until cancelled
    ///
    /// In-flight requests are completed before this returns.
    pub async fn serve(
        self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), HttpSourceError> {
        let address = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.config.bind_address());

        tracing::info!(address = %address, "HTTP receiver listening");

        let app = self.router();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .map_err(|e| HttpSourceError::Http(e.to_string()));

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            requests = snapshot.requests_total,
            accepted = snapshot.events_accepted,
            rejected = snapshot.events_rejected,
            "HTTP receiver stopped"
        );

        result
    }

    fn handler_state(&self) -> Arc<HandlerState> {
        Arc::new(HandlerState {
            expected_auth: expected_header(&self.config.bearer_token),
            queue: Arc::clone(&self.queue),
            metrics: Arc::clone(&self.metrics),
            id_field: self.config.id_field.clone(),
        })
    }
}

/// Build the axum router
fn build_router(state: Arc<HandlerState>, max_payload_size: usize) -> Router {
    Router::new()
        .route("/", post(receive_logs))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_payload_size))
        .with_state(state)
}
