//! Ratecache - keyed-expiry building blocks for HTTP services
//!
//! Provides a bounded record store with TTL expiry and FIFO eviction, a
//! fixed-window rate limiter with axum middleware, and a TTL cache with
//! memoization on top of the same store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{memoize, Cache, CacheConfig, CacheStats};
pub use config::Config;
pub use error::{GuardError, Result};
pub use limiter::{enforce_rate_limit, Decision, RateLimitGuard, RateLimitPolicy, RateLimiter};
pub use tasks::spawn_sweep_task;
