//! Rate Limiter Module
//!
//! Fixed-window admission control over an expiring store of per-key counters.
//!
//! Each key gets a window that opens on its first request and closes
//! `window_ms` later. Counters reset only when a closed window is next
//! touched. Because windows are fixed, a caller can land up to
//! `2 * max_requests` admissions around a window boundary.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::limiter::RateLimitPolicy;
use crate::store::{current_timestamp_ms, lock_store, RecordStore, SharedStore};
use crate::tasks::spawn_sweep_task;

// == Rate Record ==
/// Requests observed for one key in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    /// Unix milliseconds at which this window closes
    pub window_reset_at: u64,
}

// == Decision ==
/// Outcome of [`RateLimiter::evaluate`].
#[derive(Debug)]
#[must_use]
pub enum Decision {
    /// Proceed; carries the token used to report the outcome.
    Admit(Admission),
    /// Refuse without running the guarded work.
    Reject(Rejection),
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit(_))
    }
}

/// Details surfaced to a rejected caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Whole seconds until the key's window resets, rounded up
    pub retry_after_secs: u64,
    pub message: String,
}

// == Admission ==
/// One-shot token for an admitted request.
///
/// With `skip_successful_requests` the request is not counted at admission.
/// The token settles it exactly once: [`report`](Self::report) counts a
/// failed outcome (status >= 400) and ignores a successful one, and dropping
/// an unreported token counts as a failure. Without deferred counting the
/// request was already counted and the token is inert.
#[derive(Debug)]
#[must_use = "report the outcome; dropping a deferred admission counts it as failed"]
pub struct Admission {
    limiter: RateLimiter,
    key: String,
    pending: bool,
}

impl Admission {
    /// Key this admission was granted for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True while the outcome still has to be reported.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Reports the HTTP status of the guarded work.
    pub fn report(mut self, status: u16) {
        if self.pending {
            self.pending = false;
            if status >= 400 {
                debug!(key = %self.key, status, "counting failed request");
                self.limiter.record_failure(&self.key, current_timestamp_ms());
            }
        }
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if self.pending {
            warn!(key = %self.key, "admission dropped without an outcome, counting as failed");
            self.limiter.record_failure(&self.key, current_timestamp_ms());
        }
    }
}

// == Stats ==
/// Operational snapshot of a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimiterStats {
    /// Keys with a live window
    pub active_keys: usize,
}

// == Rate Limiter ==
/// Fixed-window rate limiter. Cloning shares the same counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    policy: Arc<RateLimitPolicy>,
    store: SharedStore<RateRecord>,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter, failing fast on an unusable policy.
    pub fn new(policy: RateLimitPolicy) -> Result<Self> {
        policy.validate()?;
        let store = RecordStore::new(policy.max_keys)?;

        Ok(Self {
            policy: Arc::new(policy),
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    // == Evaluate ==
    /// Decides whether one more request for `key` may proceed.
    pub fn evaluate(&self, key: &str) -> Decision {
        self.evaluate_at(key, current_timestamp_ms())
    }

    pub(crate) fn evaluate_at(&self, key: &str, now: u64) -> Decision {
        let deferred = self.policy.skip_successful_requests;
        let max_requests = self.policy.max_requests;

        // Check and increment under one lock so concurrent requests for the
        // same key cannot both take the last slot.
        let verdict = {
            let mut store = lock_store(&self.store);
            match store.get_mut(key, now) {
                Some(record) if record.count >= max_requests => {
                    Err(retry_after_secs(record.window_reset_at, now))
                }
                Some(record) => {
                    if !deferred {
                        record.count += 1;
                    }
                    Ok(())
                }
                None => {
                    let window_reset_at = now.saturating_add(self.policy.window_ms);
                    let record = RateRecord {
                        count: if deferred { 0 } else { 1 },
                        window_reset_at,
                    };
                    store.put(key, record, window_reset_at);
                    Ok(())
                }
            }
        };

        match verdict {
            Ok(()) => {
                debug!(key, "request admitted");
                Decision::Admit(Admission {
                    limiter: self.clone(),
                    key: key.to_string(),
                    pending: deferred,
                })
            }
            Err(retry_after_secs) => {
                warn!(key, retry_after_secs, "rate limit exceeded");
                Decision::Reject(Rejection {
                    retry_after_secs,
                    message: self.policy.message.clone(),
                })
            }
        }
    }

    fn record_failure(&self, key: &str, now: u64) {
        let mut store = lock_store(&self.store);
        match store.get_mut(key, now) {
            Some(record) => record.count = record.count.saturating_add(1),
            None => {
                let window_reset_at = now.saturating_add(self.policy.window_ms);
                let record = RateRecord {
                    count: 1,
                    window_reset_at,
                };
                store.put(key, record, window_reset_at);
            }
        }
    }

    // == Administration ==
    /// Counts keys with a live window, sweeping closed ones first.
    pub fn stats(&self) -> RateLimiterStats {
        let mut store = lock_store(&self.store);
        store.sweep(current_timestamp_ms());
        RateLimiterStats {
            active_keys: store.len(),
        }
    }

    /// Forgets every key.
    pub fn clear_all(&self) {
        lock_store(&self.store).clear();
    }

    /// Forgets one key. Returns whether it was tracked.
    pub fn clear_key(&self, key: &str) -> bool {
        lock_store(&self.store).delete(key)
    }

    /// Removes closed windows now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        lock_store(&self.store).sweep(current_timestamp_ms())
    }

    /// Starts the periodic sweep for this limiter.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        spawn_sweep_task(&self.store, interval, "rate_limiter")
    }
}

/// Whole seconds until `window_reset_at`, rounded up.
fn retry_after_secs(window_reset_at: u64, now: u64) -> u64 {
    window_reset_at.saturating_sub(now).div_ceil(1000)
}
