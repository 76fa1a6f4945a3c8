//! HTTP receiver error types

use axum::http::StatusCode;

/// HTTP receiver errors
#[derive(Debug, thiserror::Error)]
pub enum HttpSourceError {
    /// Failed to bind to address
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server failed while running
    #[error("HTTP error: {0}")]
    Http(String),

    /// Missing or wrong bearer token
    #[error("authentication failed: {0}")]
    AuthFailed(&'static str),

    /// Request carried no body
    #[error("request body is empty")]
    EmptyBody,

    /// Body is not the expected JSON document
    #[error("expected JSON body: {0}")]
    InvalidJson(String),
}

impl HttpSourceError {
    /// Status code returned to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthFailed(_) => StatusCode::FORBIDDEN,
            Self::EmptyBody => StatusCode::BAD_REQUEST,
            Self::InvalidJson(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Bind { .. } | Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error label
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthFailed(_) => "forbidden",
            Self::EmptyBody => "empty_body",
            Self::InvalidJson(_) => "invalid_json",
            Self::Bind { .. } | Self::Http(_) => "internal_error",
        }
    }
}
