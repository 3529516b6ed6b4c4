//! Response DTOs
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::limiter::RateLimiterStats;

/// Body of a `429 Too Many Requests` response.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitedResponse {
    /// Rejection message from the policy
    pub error: String,
    /// Seconds until the caller's window resets
    #[serde(rename = "retryAfter")]
    pub retry_after: u64,
}

impl RateLimitedResponse {
    pub fn new(error: impl Into<String>, retry_after: u64) -> Self {
        Self {
            error: error.into(),
            retry_after,
        }
    }
}

/// Response body for `GET /api/fib/:n`
#[derive(Debug, Clone, Serialize)]
pub struct FibonacciResponse {
    pub n: u32,
    pub value: u64,
}

/// Response body for `GET /api/config/:key`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValueResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl ConfigValueResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /api/config/:key`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /api/config/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the rate-limit reset endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub message: String,
    /// Limiters that were tracking the key (all of them for a full reset)
    pub limiters: Vec<&'static str>,
}

/// Response body for `GET /admin/stats`
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsResponse {
    pub rate_limits: BTreeMap<&'static str, RateLimiterStats>,
    pub caches: BTreeMap<&'static str, CacheStats>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
