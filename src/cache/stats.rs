//! Cache Statistics Module
//!
//! Tracks cache hits and misses, and the snapshot reported by `Cache::stats`.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

// == Cache Stats ==
/// Point-in-time view of a cache pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entries, counted after sweeping expired ones
    pub size: usize,
    /// Configured entry limit
    pub max_size: usize,
    /// Rough footprint: key bytes plus JSON-encoded value bytes.
    /// An estimate for dashboards, not allocator-accurate memory.
    pub approx_memory_bytes: usize,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing (missing or expired)
    pub misses: u64,
    /// Entries evicted to respect `max_size`
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 before any read
    pub hit_rate: f64,
}

// == Hit Rate ==
/// Calculates hits / (hits + misses), or 0.0 if no reads have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Hit Counters ==
/// Lock-free read counters shared by clones of a cache.
#[derive(Debug, Default)]
pub struct HitCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HitCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns `(hits, misses)`.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

// == Size Estimation ==
/// Counts bytes written without storing them.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Approximate footprint of one entry: key length plus JSON length of the value.
///
/// Values that fail to serialize contribute whatever was written before the
/// failure.
pub fn approx_entry_bytes<V: Serialize>(key: &str, value: &V) -> usize {
    let mut counter = ByteCounter(0);
    if let Err(err) = serde_json::to_writer(&mut counter, value) {
        debug!(key, error = %err, "value not serializable, memory estimate is partial");
    }
    key.len() + counter.0
}
