//! API Handlers
//!
//! HTTP request handlers for the demo server. Each route group sits behind
//! its own rate limiter; see [`create_router`](super::create_router).

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{memoize, Cache, CacheConfig};
use crate::config::Config;
use crate::error::{GuardError, Result};
use crate::limiter::{RateLimitPolicy, RateLimiter};
use crate::models::{
    validate_key, ConfigValueResponse, DeleteResponse, FibonacciResponse, HealthResponse,
    ResetResponse, SetConfigRequest, SetResponse, StatsResponse,
};

/// Largest `n` whose Fibonacci number fits in a u64.
pub const MAX_FIBONACCI_INPUT: u32 = 93;

/// Application state shared across all handlers.
///
/// Limiters and caches are cheap handles over shared stores, so cloning the
/// state per request shares the underlying records.
#[derive(Clone)]
pub struct AppState {
    /// Guards the admin routes
    pub auth_limiter: RateLimiter,
    /// Guards the computation routes; only failed requests count
    pub api_limiter: RateLimiter,
    /// Guards the config routes
    pub strict_limiter: RateLimiter,
    /// Memoized computation results
    pub query_cache: Cache<u64>,
    /// Runtime configuration values
    pub config_cache: Cache<Value>,
}

impl AppState {
    /// Creates the state with the preset policies and pools, sized from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let limiter = |policy: RateLimitPolicy| {
            RateLimiter::new(policy.with_max_keys(config.rate_limit_max_keys))
        };
        let max_size = config.cache_max_size;

        Ok(Self {
            auth_limiter: limiter(RateLimitPolicy::auth())?,
            api_limiter: limiter(RateLimitPolicy::general_api())?,
            strict_limiter: limiter(RateLimitPolicy::strict())?,
            query_cache: Cache::new(CacheConfig::query().with_max_size(max_size))?,
            config_cache: Cache::new(CacheConfig::config().with_max_size(max_size))?,
        })
    }

    /// Starts one sweep task per limiter and cache.
    pub fn spawn_sweepers(&self, interval: Duration) -> Vec<JoinHandle<()>> {
        vec![
            self.auth_limiter.spawn_sweeper(interval),
            self.api_limiter.spawn_sweeper(interval),
            self.strict_limiter.spawn_sweeper(interval),
            self.query_cache.spawn_sweeper(interval),
            self.config_cache.spawn_sweeper(interval),
        ]
    }

    fn limiters(&self) -> [(&'static str, &RateLimiter); 3] {
        [
            ("auth", &self.auth_limiter),
            ("api", &self.api_limiter),
            ("strict", &self.strict_limiter),
        ]
    }
}

/// Iterative Fibonacci; inputs past [`MAX_FIBONACCI_INPUT`] are rejected.
pub async fn fibonacci(n: u32) -> Result<u64> {
    if n == 0 {
        return Ok(0);
    }

    let (mut prev, mut curr) = (0u64, 1u64);
    for _ in 1..n {
        let next = prev.checked_add(curr).ok_or_else(|| {
            GuardError::InvalidRequest(format!(
                "n must be at most {}, got {}",
                MAX_FIBONACCI_INPUT, n
            ))
        })?;
        prev = curr;
        curr = next;
    }
    Ok(curr)
}

/// Handler for GET /api/fib/:n
///
/// Serves memoized results from the query pool.
pub async fn fib_handler(
    State(state): State<AppState>,
    Path(n): Path<u32>,
) -> Result<Json<FibonacciResponse>> {
    let value = memoize(&state.query_cache, "fibonacci", fibonacci)
        .call(n)
        .await?;

    Ok(Json(FibonacciResponse { n, value }))
}

/// Handler for GET /api/config/:key
pub async fn get_config_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigValueResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(GuardError::InvalidRequest(error_msg));
    }

    let value = state
        .config_cache
        .get(&key)
        .ok_or_else(|| GuardError::NotFound(key.clone()))?;

    Ok(Json(ConfigValueResponse::new(key, value)))
}

/// Handler for PUT /api/config/:key
///
/// Stores a value with an optional TTL in seconds.
pub async fn set_config_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetConfigRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = validate_key(&key).or_else(|| req.validate()) {
        return Err(GuardError::InvalidRequest(error_msg));
    }

    match req.ttl {
        Some(secs) => state.config_cache.set_with_ttl(
            key.clone(),
            req.value,
            Duration::from_secs(secs),
        )?,
        None => state.config_cache.set(key.clone(), req.value),
    }

    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /api/config/:key
pub async fn delete_config_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.config_cache.delete(&key) {
        return Err(GuardError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /admin/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut resp = StatsResponse::default();
    for (name, limiter) in state.limiters() {
        resp.rate_limits.insert(name, limiter.stats());
    }
    resp.caches.insert("query", state.query_cache.stats());
    resp.caches.insert("config", state.config_cache.stats());

    Json(resp)
}

/// Handler for DELETE /admin/rate-limits
///
/// Drops every window in every limiter.
pub async fn clear_rate_limits_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut limiters = Vec::new();
    for (name, limiter) in state.limiters() {
        limiter.clear_all();
        limiters.push(name);
    }
    info!("All rate limits reset");

    Json(ResetResponse {
        message: "All rate limits reset".to_string(),
        limiters,
    })
}

/// Handler for DELETE /admin/rate-limits/:key
///
/// Drops the key's window in every limiter. 404 if no limiter was tracking it.
pub async fn clear_rate_limit_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ResetResponse>> {
    let limiters: Vec<&'static str> = state
        .limiters()
        .into_iter()
        .filter(|(_, limiter)| limiter.clear_key(&key))
        .map(|(name, _)| name)
        .collect();

    if limiters.is_empty() {
        return Err(GuardError::NotFound(key));
    }
    info!(key = %key, ?limiters, "Rate limit reset");

    Ok(Json(ResetResponse {
        message: format!("Rate limit for '{}' reset", key),
        limiters,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::Decision;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fibonacci_values() {
        assert_eq!(fibonacci(0).await.unwrap(), 0);
        assert_eq!(fibonacci(1).await.unwrap(), 1);
        assert_eq!(fibonacci(2).await.unwrap(), 1);
        assert_eq!(fibonacci(10).await.unwrap(), 55);
        assert_eq!(
            fibonacci(MAX_FIBONACCI_INPUT).await.unwrap(),
            12_200_160_415_121_876_738
        );
    }

    #[tokio::test]
    async fn test_fibonacci_overflow_is_invalid_request() {
        let result = fibonacci(MAX_FIBONACCI_INPUT + 1).await;
        assert!(matches!(result, Err(GuardError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_fib_handler_memoizes() {
        let state = test_state();

        let Json(first) = fib_handler(State(state.clone()), Path(20)).await.unwrap();
        assert_eq!(first.value, 6765);

        let Json(second) = fib_handler(State(state.clone()), Path(20)).await.unwrap();
        assert_eq!(second.value, 6765);

        let stats = state.query_cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_fib_handler_does_not_cache_errors() {
        let state = test_state();
        assert!(fib_handler(State(state.clone()), Path(200)).await.is_err());
        assert_eq!(state.query_cache.stats().size, 0);
    }

    #[tokio::test]
    async fn test_config_set_get_delete() {
        let state = test_state();

        let req = SetConfigRequest {
            value: serde_json::json!({"enabled": true}),
            ttl: Some(60),
        };
        set_config_handler(State(state.clone()), Path("flags".to_string()), Json(req))
            .await
            .unwrap();

        let Json(got) = get_config_handler(State(state.clone()), Path("flags".to_string()))
            .await
            .unwrap();
        assert_eq!(got.value["enabled"], true);

        delete_config_handler(State(state.clone()), Path("flags".to_string()))
            .await
            .unwrap();

        let result = get_config_handler(State(state), Path("flags".to_string())).await;
        assert!(matches!(result, Err(GuardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_config_set_rejects_zero_ttl() {
        let state = test_state();
        let req = SetConfigRequest {
            value: Value::Null,
            ttl: Some(0),
        };
        let result = set_config_handler(State(state), Path("k".to_string()), Json(req)).await;
        assert!(matches!(result, Err(GuardError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_config_key() {
        let result = delete_config_handler(State(test_state()), Path("nope".to_string())).await;
        assert!(matches!(result, Err(GuardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_rate_limit_key_reports_limiters() {
        let state = test_state();
        assert!(state.strict_limiter.evaluate("1.2.3.4").is_admitted());

        let Json(resp) =
            clear_rate_limit_key_handler(State(state.clone()), Path("1.2.3.4".to_string()))
                .await
                .unwrap();
        assert_eq!(resp.limiters, vec!["strict"]);

        let again =
            clear_rate_limit_key_handler(State(state), Path("1.2.3.4".to_string())).await;
        assert!(matches!(again, Err(GuardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_all_rate_limits() {
        let state = test_state();
        for _ in 0..3 {
            assert!(matches!(state.auth_limiter.evaluate("k"), Decision::Admit(_)));
        }

        let Json(resp) = clear_rate_limits_handler(State(state.clone())).await;
        assert_eq!(resp.limiters.len(), 3);
        assert_eq!(state.auth_limiter.stats().active_keys, 0);
    }

    #[tokio::test]
    async fn test_stats_handler_lists_every_component() {
        let Json(resp) = stats_handler(State(test_state())).await;
        assert_eq!(resp.rate_limits.len(), 3);
        assert_eq!(resp.caches.len(), 2);
        assert_eq!(resp.caches["config"].max_size, 1000);
    }
}
