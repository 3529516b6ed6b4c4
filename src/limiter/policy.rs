//! Rate Limit Policy Module
//!
//! Configuration for a single rate limiter instance, with the stock presets.

use crate::error::{GuardError, Result};

/// Message returned to rejected callers unless a policy overrides it.
pub const DEFAULT_MESSAGE: &str = "Too many requests, please try again later.";

/// Keys tracked per limiter unless a policy overrides it.
pub const DEFAULT_MAX_KEYS: usize = 10_000;

// == Rate Limit Policy ==
/// Fixed-window limits for one class of routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Length of the counting window in milliseconds
    pub window_ms: u64,
    /// Admissions allowed per key per window
    pub max_requests: u32,
    /// Text surfaced on rejection
    pub message: String,
    /// Count only failed outcomes (status >= 400) toward the limit
    pub skip_successful_requests: bool,
    /// Maximum distinct keys tracked at once
    pub max_keys: usize,
}

impl RateLimitPolicy {
    /// Creates a policy with the default message and all requests counted.
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
            message: DEFAULT_MESSAGE.to_string(),
            skip_successful_requests: false,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    // == Presets ==
    /// Login and credential endpoints: 50 per 15 minutes.
    pub fn auth() -> Self {
        Self::new(900_000, 50)
            .with_message("Too many authentication attempts, please try again later.")
    }

    /// General API traffic: 500 failed requests per 15 minutes.
    pub fn general_api() -> Self {
        Self::new(900_000, 500).skip_successful_requests(true)
    }

    /// Interactive or expensive endpoints: 50 per minute.
    pub fn strict() -> Self {
        Self::new(60_000, 50)
    }

    // == Builders ==
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn skip_successful_requests(mut self, skip: bool) -> Self {
        self.skip_successful_requests = skip;
        self
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    // == Validate ==
    /// Rejects limits that could never admit anything or never reset.
    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(GuardError::InvalidConfig(
                "window_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(GuardError::InvalidConfig(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        if self.max_keys == 0 {
            return Err(GuardError::InvalidConfig(
                "max_keys must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
