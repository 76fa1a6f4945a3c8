//! HTTP response bodies

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::error::HttpSourceError;

/// Message returned for every accepted webhook call
pub const RECEIVED_MESSAGE: &str = "Received!";

/// Body of a successful `POST /`
#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    pub message: &'static str,
    pub accepted: usize,
    pub rejected: usize,
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub queued: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub request_id: String,
}

/// Build a success response
pub fn received(accepted: usize, rejected: usize) -> Response {
    let body = ReceiveResponse {
        message: RECEIVED_MESSAGE,
        accepted,
        rejected,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Build an error response for a request-level failure
pub fn error_response(error: &HttpSourceError) -> Response {
    let body = ErrorResponse {
        error: error.label(),
        message: error.to_string(),
        request_id: generate_request_id(),
    };
    (error.status_code(), Json(body)).into_response()
}

/// Generate a request ID for correlating client errors with logs
pub fn generate_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().simple())
}
