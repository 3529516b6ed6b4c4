//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to check read statistics, capacity and memoization.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::{memoize, Cache, CacheConfig};
use crate::error::GuardError;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;
const NOW: u64 = 1_700_000_000_000;

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}".prop_map(|s| s)
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn string_cache(max_size: usize) -> Cache<String> {
    Cache::new(CacheConfig::new(Duration::from_secs(300), max_size)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics accuracy: hits and misses match what `get` returned.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let cache = string_cache(TEST_MAX_SIZE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => cache.set(key, value),
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // Last write wins, and `has` agrees with `get` for every key.
    #[test]
    fn prop_last_write_wins(
        entries in prop::collection::vec((valid_key_strategy(), valid_value_strategy()), 1..60)
    ) {
        let cache = string_cache(TEST_MAX_SIZE);
        let mut latest = std::collections::HashMap::new();

        for (key, value) in entries {
            cache.set(key.clone(), value.clone());
            latest.insert(key, value);
        }

        for (key, value) in &latest {
            prop_assert!(cache.has(key));
            let got = cache.get(key);
            prop_assert_eq!(got.as_ref(), Some(value));
        }
        prop_assert_eq!(cache.stats().size, latest.len());
    }

    // Capacity enforcement: size never exceeds max_size, and at least every
    // distinct key beyond max_size forced an eviction.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec(valid_key_strategy(), 1..200)
    ) {
        let max_size = 20;
        let cache = string_cache(max_size);
        let mut distinct = HashSet::new();

        for key in keys {
            distinct.insert(key.clone());
            cache.set(key, "v".to_string());

            let stats = cache.stats();
            prop_assert!(stats.size <= max_size, "Cache size {} exceeds max {}", stats.size, max_size);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.size, distinct.len().min(max_size));
        prop_assert!(stats.evictions as usize >= distinct.len().saturating_sub(max_size));
    }

    // TTL expiry at arbitrary probe times.
    #[test]
    fn prop_ttl_expiry(ttl_ms in 1u64..5_000, probe in 0u64..10_000) {
        let cache = string_cache(TEST_MAX_SIZE);
        cache.set_at("k".to_string(), "v".to_string(), Duration::from_millis(ttl_ms), NOW);

        prop_assert_eq!(cache.get_at("k", NOW + probe).is_some(), probe < ttl_ms);
    }

    // The wrapped computation returns exactly what the bare one returns, and
    // runs once per distinct argument.
    #[test]
    fn prop_memoized_matches_unwrapped(args in prop::collection::vec(-50i64..50, 1..40)) {
        let cache: Cache<i64> = Cache::new(CacheConfig::query()).unwrap();
        let calls = AtomicUsize::new(0);
        let compute = |n: i64| n * 3 - 1;
        let wrapped = memoize(&cache, "triple_minus_one", |n: i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, GuardError>(compute(n)) }
        });

        let distinct: HashSet<i64> = args.iter().copied().collect();
        for n in args {
            let result = tokio_test::block_on(wrapped.call(n));
            prop_assert_eq!(result.unwrap(), compute(n));
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), distinct.len());
    }
}
