//! Memoization Module
//!
//! Wraps a computation so results are served from a [`Cache`] while fresh.
//!
//! # Example
//! ```ignore
//! let pool = Cache::new(CacheConfig::query())?;
//! let lookup = memoize(&pool, "user_orders", |user_id: u64| async move {
//!     db.orders_for(user_id).await
//! });
//! let orders = lookup.call(42).await?;
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::cache::validate_ttl_override;
use crate::cache::Cache;
use crate::error::{GuardError, Result};

/// Builds the cache key for `name` called with `args`.
///
/// The key is the JSON array `[name, args]`. Arguments pass through
/// `serde_json::Value` first, which orders object keys, so maps with the same
/// contents yield the same key however they were built.
pub fn memo_key<A>(name: &str, args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    let canonical = serde_json::to_value(args)?;
    Ok(serde_json::to_string(&(name, canonical))?)
}

// == Memoized ==
/// A computation whose successful results are cached per argument value.
///
/// Behaves like the wrapped computation except that a fresh cached result is
/// returned without running it. Errors are passed through and never cached.
pub struct Memoized<A, V, F> {
    cache: Cache<V>,
    name: Arc<str>,
    ttl: Option<Duration>,
    compute: F,
    _args: PhantomData<fn(A)>,
}

/// Wraps `compute` so its results are cached in `cache` under `name`.
pub fn memoize<A, V, F, Fut>(
    cache: &Cache<V>,
    name: impl Into<String>,
    compute: F,
) -> Memoized<A, V, F>
where
    F: Fn(A) -> Fut,
    Fut: Future,
{
    Memoized {
        cache: cache.clone(),
        name: Arc::from(name.into()),
        ttl: None,
        compute,
        _args: PhantomData,
    }
}

impl<A, V, F> Memoized<A, V, F> {
    /// Caches results for `ttl` instead of the pool default.
    ///
    /// Fails with [`GuardError::InvalidConfig`] for a zero `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self> {
        validate_ttl_override(ttl)?;
        self.ttl = Some(ttl);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A, V, F> Memoized<A, V, F>
where
    A: Serialize,
    V: Clone + Send + 'static,
{
    /// Returns the cached result for `args`, or computes and caches it.
    ///
    /// A key that cannot be derived from `args` fails the call with
    /// [`GuardError::KeySerialization`] instead of bypassing the cache.
    pub async fn call<Fut, E>(&self, args: A) -> std::result::Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: From<GuardError>,
    {
        let key = memo_key(&self.name, &args).map_err(E::from)?;

        if let Some(hit) = self.cache.get(&key) {
            debug!(name = %self.name, "memoized result served from cache");
            return Ok(hit);
        }

        let value = (self.compute)(args).await?;
        match self.ttl {
            Some(ttl) => self
                .cache
                .set_with_ttl(key, value.clone(), ttl)
                .map_err(E::from)?,
            None => self.cache.set(key, value.clone()),
        }
        Ok(value)
    }
}
