//! Record Store Module
//!
//! Keyed storage with per-record expiry, FIFO capacity eviction and sweeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{GuardError, Result};
use crate::store::{InsertionOrder, Record};

/// A store shared between request handlers and its sweep task.
pub type SharedStore<S> = Arc<Mutex<RecordStore<S>>>;

/// Locks a shared store, recovering the guard if a previous holder panicked.
///
/// Every critical section leaves the map consistent before it can panic, so a
/// poisoned lock carries no torn state.
pub fn lock_store<S>(store: &Mutex<RecordStore<S>>) -> MutexGuard<'_, RecordStore<S>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Record Store ==
/// Keyed store of `(state, expires_at)` records with bounded capacity.
///
/// Expiry is enforced lazily on every read and eagerly by [`sweep`](Self::sweep).
/// When a new key arrives at capacity, the earliest-inserted record still
/// present is evicted; reads never change that order.
#[derive(Debug)]
pub struct RecordStore<S> {
    /// Key-record storage
    records: HashMap<String, Record<S>>,
    /// Insertion order for eviction
    order: InsertionOrder,
    /// Maximum number of records allowed
    max_entries: usize,
    /// Next insertion sequence number
    next_seq: u64,
    /// Records evicted for capacity since creation
    evictions: u64,
}

impl<S> RecordStore<S> {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` records.
    pub fn new(max_entries: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(GuardError::InvalidConfig(
                "store capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            records: HashMap::new(),
            order: InsertionOrder::new(),
            max_entries,
            next_seq: 0,
            evictions: 0,
        })
    }

    // == Put ==
    /// Inserts or replaces the record for `key`.
    ///
    /// Replacing keeps the key's original insertion position. Inserting a new
    /// key into a full store first evicts the earliest-inserted record, whose
    /// key is returned.
    pub fn put(&mut self, key: impl Into<String>, state: S, expires_at: u64) -> Option<String> {
        let key = key.into();

        if let Some(record) = self.records.get_mut(&key) {
            record.state = state;
            record.expires_at = expires_at;
            return None;
        }

        let mut evicted = None;
        if self.records.len() >= self.max_entries {
            let records = &self.records;
            evicted = self
                .order
                .pop_oldest(|k, seq| records.get(k).is_some_and(|r| r.seq == seq));
            if let Some(victim) = &evicted {
                self.records.remove(victim);
                self.evictions += 1;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.push(seq, key.clone());
        self.records.insert(key, Record::new(state, expires_at, seq));

        let records = &self.records;
        self.order
            .compact_if_needed(records.len(), |k, seq| {
                records.get(k).is_some_and(|r| r.seq == seq)
            });

        evicted
    }

    // == Get ==
    /// Returns the live state for `key`, removing it if it has expired.
    pub fn get(&mut self, key: &str, now: u64) -> Option<&S> {
        self.expire_if_stale(key, now);
        self.records.get(key).map(|r| &r.state)
    }

    /// Mutable variant of [`get`](Self::get) with the same expiry behaviour.
    pub fn get_mut(&mut self, key: &str, now: u64) -> Option<&mut S> {
        self.expire_if_stale(key, now);
        self.records.get_mut(key).map(|r| &mut r.state)
    }

    // == Delete ==
    /// Removes `key`. Returns whether a record was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    // == Sweep ==
    /// Removes every record expired at `now`.
    ///
    /// Returns the number of records removed. A second call with the same
    /// `now` removes nothing.
    pub fn sweep(&mut self, now: u64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired_at(now));
        let removed = before - self.records.len();

        if removed > 0 {
            let records = &self.records;
            self.order
                .compact_if_needed(records.len(), |k, seq| {
                    records.get(k).is_some_and(|r| r.seq == seq)
                });
        }

        removed
    }

    // == Iteration ==
    /// Iterates over stored records, including expired ones not yet swept.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record<S>)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    // == Length ==
    /// Returns the number of stored records, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records the store holds.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Number of records evicted for capacity since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn expire_if_stale(&mut self, key: &str, now: u64) {
        let stale = self
            .records
            .get(key)
            .is_some_and(|record| record.is_expired_at(now));
        if stale {
            self.records.remove(key);
        }
    }
}
