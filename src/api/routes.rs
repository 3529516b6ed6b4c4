//! API Routes
//!
//! Configures the Axum router. Each route group carries its own rate limit
//! guard as a route layer, so unmatched paths are never counted.

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_rate_limit_key_handler, clear_rate_limits_handler, delete_config_handler,
    fib_handler, get_config_handler, health_handler, set_config_handler, stats_handler,
    AppState,
};
use crate::limiter::{enforce_rate_limit, RateLimitGuard};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check, never rate limited
/// - `GET /api/fib/:n` - Memoized Fibonacci (general API policy)
/// - `GET|PUT|DELETE /api/config/:key` - Config values (strict policy)
/// - `GET /admin/stats` - Limiter and cache statistics (auth policy)
/// - `DELETE /admin/rate-limits` - Reset every limiter (auth policy)
/// - `DELETE /admin/rate-limits/:key` - Reset one key (auth policy)
///
/// Requests are keyed by peer IP; serve with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/fib/:n", get(fib_handler))
        .route_layer(middleware::from_fn_with_state(
            RateLimitGuard::by_peer_addr(state.api_limiter.clone()),
            enforce_rate_limit,
        ));

    let config = Router::new()
        .route(
            "/api/config/:key",
            get(get_config_handler)
                .put(set_config_handler)
                .delete(delete_config_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            RateLimitGuard::by_peer_addr(state.strict_limiter.clone()),
            enforce_rate_limit,
        ));

    let admin = Router::new()
        .route("/admin/stats", get(stats_handler))
        .route("/admin/rate-limits", delete(clear_rate_limits_handler))
        .route("/admin/rate-limits/:key", delete(clear_rate_limit_key_handler))
        .route_layer(middleware::from_fn_with_state(
            RateLimitGuard::by_peer_addr(state.auth_limiter.clone()),
            enforce_rate_limit,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .merge(config)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::limiter::UNKNOWN_PEER;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, AppState) {
        let state = AppState::from_config(&Config::default()).unwrap();
        (create_router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        for limiter in [&state.auth_limiter, &state.api_limiter, &state.strict_limiter] {
            assert_eq!(limiter.stats().active_keys, 0);
        }
    }

    #[tokio::test]
    async fn test_stats_endpoint_counts_against_auth_limiter() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.auth_limiter.stats().active_keys, 1);
        assert!(state.auth_limiter.clear_key(UNKNOWN_PEER));
    }

    #[tokio::test]
    async fn test_fib_endpoint() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/fib/10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_config_get_not_found() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/config/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_counted() {
        let (app, state) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.strict_limiter.stats().active_keys, 0);
    }
}
