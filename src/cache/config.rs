//! Cache Configuration Module
//!
//! Lifetime and capacity settings for a cache pool, with the stock pools.
//!
//! The pool constructors are starting points for typical workloads, not
//! shared instances: each call site builds and owns its own [`Cache`].
//!
//! [`Cache`]: crate::cache::Cache

use std::time::Duration;

use crate::error::{GuardError, Result};

/// Lifetime used when no pool or override applies (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Entry limit used when none is given.
pub const DEFAULT_MAX_SIZE: usize = 1000;

// == Cache Config ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of an entry unless overridden per write
    pub ttl: Duration,
    /// Maximum number of entries
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self { ttl, max_size }
    }

    // == Pools ==
    /// Expensive derived queries: 2 minutes.
    pub fn query() -> Self {
        Self::new(Duration::from_millis(120_000), DEFAULT_MAX_SIZE)
    }

    /// Authenticated identity lookups: 10 minutes.
    pub fn identity() -> Self {
        Self::new(Duration::from_millis(600_000), DEFAULT_MAX_SIZE)
    }

    /// Slowly changing configuration: 1 hour.
    pub fn config() -> Self {
        Self::new(Duration::from_millis(3_600_000), DEFAULT_MAX_SIZE)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    // == Validate ==
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(GuardError::InvalidConfig(
                "cache ttl must be greater than zero".to_string(),
            ));
        }
        if self.max_size == 0 {
            return Err(GuardError::InvalidConfig(
                "cache max_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
