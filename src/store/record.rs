//! Record Module
//!
//! Defines the structure for individual expiring records.

use std::time::{SystemTime, UNIX_EPOCH};

// == Record ==
/// A single stored state with its expiry and insertion sequence.
#[derive(Debug, Clone)]
pub struct Record<S> {
    /// The stored state
    pub state: S,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Insertion sequence number, used to match FIFO queue slots
    pub(crate) seq: u64,
}

impl<S> Record<S> {
    // == Constructor ==
    pub(crate) fn new(state: S, expires_at: u64, seq: u64) -> Self {
        Self {
            state,
            expires_at,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the record has expired at `now`.
    ///
    /// Boundary condition: a record is expired when `now >= expires_at`, so it
    /// stops being readable the very millisecond its lifetime elapses.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, saturating at zero.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as zero rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
