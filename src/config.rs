//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::store::DEFAULT_SWEEP_INTERVAL_SECS;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Rate-limit windows and cache TTLs come from the policy and pool presets,
/// not from here.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Maximum entries held by each cache pool
    pub cache_max_size: usize,
    /// Maximum distinct keys tracked by each rate limiter
    pub rate_limit_max_keys: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expired-entry sweep frequency in seconds (default: 60, 0 is rejected)
    /// - `CACHE_MAX_SIZE` - Maximum entries per cache pool (default: 1000)
    /// - `RATE_LIMIT_MAX_KEYS` - Maximum tracked keys per limiter (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: nonzero_env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            cache_max_size: env_or("CACHE_MAX_SIZE", defaults.cache_max_size),
            rate_limit_max_keys: env_or("RATE_LIMIT_MAX_KEYS", defaults.rate_limit_max_keys),
        }
    }

    /// Sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            cache_max_size: 1000,
            rate_limit_max_keys: 10_000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`env_or`], but a zero value is ignored in favor of the default.
fn nonzero_env_or(name: &str, default: u64) -> u64 {
    match env_or(name, default) {
        0 => {
            warn!("{} must be greater than zero, using default {}", name, default);
            default
        }
        value => value,
    }
}
