//! Bearer token check
//!
//! The full `Authorization` header value is compared in constant time
//! against `Bearer <token>`.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use subtle::ConstantTimeEq;

use super::error::HttpSourceError;

/// Expected `Authorization` header value for a token
pub fn expected_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Check the request's `Authorization` header against `expected`
pub fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<(), HttpSourceError> {
    let provided = headers
        .get(AUTHORIZATION)
        .ok_or(HttpSourceError::AuthFailed("missing authorization header"))?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(HttpSourceError::AuthFailed("invalid bearer token"))
    }
}
