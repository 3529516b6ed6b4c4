//! Insertion Order Module
//!
//! Tracks the order in which keys entered the store, for FIFO eviction.

use std::collections::VecDeque;

/// Stale slots tolerated before the queue is compacted.
const COMPACT_SLACK: usize = 32;

// == Insertion Order ==
/// FIFO queue of `(sequence, key)` slots.
///
/// Front = earliest inserted, back = latest inserted. Deleting a key does not
/// touch the queue; the slot goes stale and is skipped when it reaches the
/// front. A slot is live only while the store still holds the key under the
/// same sequence number, so a key deleted and re-inserted is ordered by its
/// newer insertion.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    slots: VecDeque<(u64, String)>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            slots: VecDeque::new(),
        }
    }

    // == Push ==
    /// Appends a newly inserted key.
    pub fn push(&mut self, seq: u64, key: String) {
        self.slots.push_back((seq, key));
    }

    // == Pop Oldest ==
    /// Removes and returns the earliest-inserted key that is still live.
    ///
    /// Stale slots in front of it are discarded along the way.
    pub fn pop_oldest<F>(&mut self, is_live: F) -> Option<String>
    where
        F: Fn(&str, u64) -> bool,
    {
        while let Some((seq, key)) = self.slots.pop_front() {
            if is_live(key.as_str(), seq) {
                return Some(key);
            }
        }
        None
    }

    // == Compact ==
    /// Drops stale slots once they outnumber live ones.
    ///
    /// Keeps the queue proportional to the store so eviction stays O(1)
    /// amortised under heavy delete traffic.
    pub fn compact_if_needed<F>(&mut self, live: usize, is_live: F)
    where
        F: Fn(&str, u64) -> bool,
    {
        if self.slots.len() > live.saturating_mul(2) + COMPACT_SLACK {
            self.slots.retain(|(seq, key)| is_live(key.as_str(), *seq));
        }
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    // == Length ==
    /// Returns the number of slots, stale ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
