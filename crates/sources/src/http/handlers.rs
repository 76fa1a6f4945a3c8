//! HTTP route handlers
//!
//! # Endpoints
//!
//! - `POST /` - Auth0 log stream webhook
//! - `GET /health` - Health check

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use relay_pipeline::EventQueue;
use relay_protocol::Event;
use serde_json::Value;

use super::auth::verify_bearer;
use super::error::HttpSourceError;
use super::log_types;
use super::metrics::HttpReceiverMetrics;
use super::response::{HealthResponse, error_response, received};

/// Shared state for handlers
pub struct HandlerState {
    /// Full expected `Authorization` header value
    pub expected_auth: String,
    pub queue: Arc<EventQueue>,
    pub metrics: Arc<HttpReceiverMetrics>,
    pub id_field: String,
}

/// POST / - Receive a batch of log stream entries
///
/// Body: `{"logs": [{"log_id": "...", "data": {...}}, ...]}`. Entries that
/// cannot become events are counted as rejected; the rest are enriched and
/// inserted into the queue in request order.
pub async fn receive_logs(
    State(state): State<Arc<HandlerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.metrics.request_received(body.len() as u64);

    if let Err(e) = verify_bearer(&headers, &state.expected_auth) {
        state.metrics.auth_failure();
        tracing::debug!(error = %e, "webhook call rejected");
        return error_response(&e);
    }

    let logs = match parse_body(&body) {
        Ok(logs) => logs,
        Err(e) => {
            state.metrics.request_client_error();
            tracing::debug!(error = %e, bytes = body.len(), "invalid webhook body");
            return error_response(&e);
        }
    };

    let (events, rejected) = build_events(logs, &state.id_field);
    let accepted = events.len();
    let evicted = state.queue.insert_many(events).await;

    state.metrics.events_processed(accepted, rejected, evicted);
    state.metrics.request_success();

    tracing::debug!(accepted, rejected, evicted, "webhook events queued");
    received(accepted, rejected)
}

/// GET /health - Liveness and current queue depth
pub async fn health_check(State(state): State<Arc<HandlerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        queued: state.queue.size().await,
    })
}

/// Extract the `logs` array from a request body
///
/// A JSON object without `logs` is a valid, empty delivery.
pub fn parse_body(body: &[u8]) -> Result<Vec<Value>, HttpSourceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(HttpSourceError::EmptyBody);
    }

    let document: Value =
        serde_json::from_slice(body).map_err(|e| HttpSourceError::InvalidJson(e.to_string()))?;

    let Value::Object(mut map) = document else {
        return Err(HttpSourceError::InvalidJson("expected a JSON object".into()));
    };

    match map.remove("logs") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(logs)) => Ok(logs),
        Some(_) => Err(HttpSourceError::InvalidJson("'logs' must be an array".into())),
    }
}

/// Turn log entries into enriched events, counting the ones skipped
pub fn build_events(logs: Vec<Value>, id_field: &str) -> (Vec<Event>, usize) {
    let mut rejected = 0;

    let events = logs
        .into_iter()
        .filter_map(|mut entry| {
            log_types::enrich(&mut entry);
            match Event::from_record(entry, id_field) {
                Ok(event) => Some(event),
                Err(e) => {
                    rejected += 1;
                    tracing::debug!(error = %e, "skipping log entry");
                    None
                }
            }
        })
        .collect();

    (events, rejected)
}
