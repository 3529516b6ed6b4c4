//! Error types for the rate limiter and cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Guard Error Enum ==
/// Unified error type for the keyed-expiry components and the demo server.
///
/// Admission denial and cache misses are deliberately absent: they are
/// ordinary outcomes (`Decision::Reject`, `None`), not faults.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Rejected configuration, raised at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Memoization arguments could not be serialized into a key
    #[error("Failed to derive cache key: {0}")]
    KeySerialization(#[from] serde_json::Error),

    /// Key not found in a cache pool
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = match &self {
            GuardError::NotFound(_) => StatusCode::NOT_FOUND,
            GuardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GuardError::InvalidConfig(_)
            | GuardError::KeySerialization(_)
            | GuardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = GuardError::NotFound("k".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = GuardError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let internal = GuardError::Internal("boom".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_serialization_error_converts() {
        let err: serde_json::Error = serde_json::from_str::<u32>("nope").unwrap_err();
        let guard: GuardError = err.into();
        assert!(matches!(guard, GuardError::KeySerialization(_)));
        assert!(guard.to_string().starts_with("Failed to derive cache key"));
    }
}
