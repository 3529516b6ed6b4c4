//! Expiry Sweep Task
//!
//! Background task that periodically removes expired records from a store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::{
    current_timestamp_ms, lock_store, SharedStore, DEFAULT_SWEEP_INTERVAL_SECS,
};

/// Spawns a background task that periodically sweeps expired records.
///
/// The task holds only a weak reference to the store: once every owner of
/// the store is dropped, the next tick finds nothing to sweep and the task
/// ends on its own. The store lock is held only for the sweep itself, never
/// across the sleep.
///
/// # Arguments
/// * `store` - shared store to sweep
/// * `interval` - time between sweeps
/// * `label` - name used in log lines (e.g. `"rate_limiter"`, `"cache"`)
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let limiter = RateLimiter::new(RateLimitPolicy::strict())?;
/// let handle = limiter.spawn_sweeper(Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<S>(
    store: &SharedStore<S>,
    interval: Duration,
    label: &'static str,
) -> JoinHandle<()>
where
    S: Send + 'static,
{
    let store = Arc::downgrade(store);
    let interval = effective_interval(interval, label);

    tokio::spawn(async move {
        info!(
            "Starting {} sweep task with interval of {:?}",
            label, interval
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("{} store dropped, stopping sweep task", label);
                break;
            };

            let removed = lock_store(&store).sweep(current_timestamp_ms());

            // Log sweep statistics
            if removed > 0 {
                info!("{} sweep: removed {} expired records", label, removed);
            } else {
                debug!("{} sweep: no expired records found", label);
            }
        }
    })
}

/// A zero interval would sweep in a tight loop; use the default instead.
fn effective_interval(interval: Duration, label: &str) -> Duration {
    if interval.is_zero() {
        warn!(
            "{} sweep interval is zero, using {}s",
            label, DEFAULT_SWEEP_INTERVAL_SECS
        );
        Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use std::sync::Mutex;

    fn shared(max: usize) -> SharedStore<String> {
        Arc::new(Mutex::new(RecordStore::new(max).unwrap()))
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_records() {
        let store = shared(100);

        lock_store(&store).put("expire_soon", "value".to_string(), current_timestamp_ms() + 50);

        let handle = spawn_sweep_task(&store, Duration::from_millis(25), "test");

        // Wait for the record to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(250)).await;

        // Removed without any read touching it
        assert_eq!(lock_store(&store).len(), 0, "Expired record should have been swept");

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_live_records() {
        let store = shared(100);

        lock_store(&store).put(
            "long_lived",
            "value".to_string(),
            current_timestamp_ms() + 3_600_000,
        );

        let handle = spawn_sweep_task(&store, Duration::from_millis(25), "test");
        tokio::time::sleep(Duration::from_millis(150)).await;

        {
            let mut guard = lock_store(&store);
            let value = guard.get("long_lived", current_timestamp_ms());
            assert_eq!(value.map(String::as_str), Some("value"));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_stops_when_store_dropped() {
        let store = shared(10);
        let handle = spawn_sweep_task(&store, Duration::from_millis(10), "test");

        drop(store);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(handle.is_finished(), "Task should end once the store is gone");
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let store = shared(10);
        let handle = spawn_sweep_task(&store, Duration::from_secs(1), "test");

        // Abort immediately
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[test]
    fn test_zero_interval_uses_default() {
        assert_eq!(
            effective_interval(Duration::ZERO, "test"),
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
        assert_eq!(
            effective_interval(Duration::from_millis(25), "test"),
            Duration::from_millis(25)
        );
    }

    #[tokio::test]
    async fn test_zero_interval_does_not_sweep_continuously() {
        let store = shared(10);
        lock_store(&store).put("expired", "value".to_string(), 0);

        let handle = spawn_sweep_task(&store, Duration::ZERO, "test");
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Swept only after the default interval, so the record is still held
        assert_eq!(lock_store(&store).len(), 1);

        handle.abort();
    }
}
