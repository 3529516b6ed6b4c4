//! Rate Limiter Module
//!
//! Fixed-window admission control and its axum middleware.

#[allow(clippy::module_inception)]
mod limiter;
mod middleware;
mod policy;

// Re-export public types
pub use limiter::{Admission, Decision, RateLimiter, RateLimiterStats, RateRecord, Rejection};
pub use middleware::{enforce_rate_limit, peer_ip_key, KeyExtractor, RateLimitGuard, UNKNOWN_PEER};
pub use policy::{RateLimitPolicy, DEFAULT_MAX_KEYS, DEFAULT_MESSAGE};
