//! Cache Module
//!
//! TTL caching with bounded size, and the memoizing adapter built on it.

#[allow(clippy::module_inception)]
mod cache;
mod config;
mod memo;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use cache::Cache;
pub use config::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_TTL};
pub use memo::{memo_key, memoize, Memoized};
pub use stats::CacheStats;
