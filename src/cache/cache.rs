//! Cache Module
//!
//! TTL cache over the expiring record store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::stats::{approx_entry_bytes, hit_rate, HitCounters};
use crate::cache::{CacheConfig, CacheStats};
use crate::error::{GuardError, Result};
use crate::store::{current_timestamp_ms, lock_store, RecordStore, SharedStore};
use crate::tasks::spawn_sweep_task;

// == Cache ==
/// Bounded, expiring map from string keys to values.
///
/// Entries are readable until their TTL elapses. When full, a write of a new
/// key evicts the earliest-inserted entry. Cloning shares the same entries.
#[derive(Debug)]
pub struct Cache<V> {
    config: CacheConfig,
    store: SharedStore<V>,
    counters: Arc<HitCounters>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            store: Arc::clone(&self.store),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<V: Clone + Send + 'static> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache, failing fast on a zero TTL or size.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = RecordStore::new(config.max_size)?;

        Ok(Self {
            config,
            store: Arc::new(Mutex::new(store)),
            counters: Arc::new(HitCounters::new()),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores `value` for the pool's default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key.into(), value, self.config.ttl, current_timestamp_ms());
    }

    /// Stores `value` for `ttl` instead of the pool default.
    ///
    /// A zero `ttl` is rejected: the entry could never be read, yet inserting
    /// it into a full cache would still evict a live one.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        validate_ttl_override(ttl)?;
        self.set_at(key.into(), value, ttl, current_timestamp_ms());
        Ok(())
    }

    pub(crate) fn set_at(&self, key: String, value: V, ttl: Duration, now: u64) {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let evicted = lock_store(&self.store).put(key, value, now.saturating_add(ttl_ms));

        if let Some(evicted) = evicted {
            debug!(key = %evicted, "cache full, evicted earliest entry");
        }
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, current_timestamp_ms())
    }

    pub(crate) fn get_at(&self, key: &str, now: u64) -> Option<V> {
        let value = lock_store(&self.store).get(key, now).cloned();

        match value {
            Some(_) => self.counters.record_hit(),
            None => self.counters.record_miss(),
        }
        value
    }

    // == Has ==
    /// True iff [`get`](Self::get) would return a value. Does not count as a read.
    pub fn has(&self, key: &str) -> bool {
        self.has_at(key, current_timestamp_ms())
    }

    pub(crate) fn has_at(&self, key: &str, now: u64) -> bool {
        lock_store(&self.store).get(key, now).is_some()
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        lock_store(&self.store).delete(key)
    }

    pub fn clear(&self) {
        lock_store(&self.store).clear();
    }

    // == Sweep ==
    /// Removes expired entries now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        lock_store(&self.store).sweep(current_timestamp_ms())
    }

    /// Starts the periodic sweep for this cache.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        spawn_sweep_task(&self.store, interval, "cache")
    }
}

impl<V: Serialize> Cache<V> {
    // == Stats ==
    /// Reports size, capacity, estimated memory and read counters.
    ///
    /// Expired entries are swept first so `size` counts only live ones.
    pub fn stats(&self) -> CacheStats {
        self.stats_at(current_timestamp_ms())
    }

    pub(crate) fn stats_at(&self, now: u64) -> CacheStats {
        let (hits, misses) = self.counters.snapshot();
        let mut store = lock_store(&self.store);
        store.sweep(now);

        let approx_memory_bytes: usize = store
            .iter()
            .map(|(key, record)| approx_entry_bytes(key, &record.state))
            .sum();

        CacheStats {
            size: store.len(),
            max_size: store.capacity(),
            approx_memory_bytes,
            hits,
            misses,
            evictions: store.evictions(),
            hit_rate: hit_rate(hits, misses),
        }
    }
}

/// Rejects a per-entry TTL of zero.
pub(crate) fn validate_ttl_override(ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(GuardError::InvalidConfig(
            "ttl override must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
