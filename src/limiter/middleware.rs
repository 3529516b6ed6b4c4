//! Rate Limit Middleware
//!
//! Connects a [`RateLimiter`] to axum routes.
//!
//! # Usage
//! ```ignore
//! let guard = RateLimitGuard::by_peer_addr(RateLimiter::new(RateLimitPolicy::strict())?);
//! let routes = Router::new()
//!     .route("/login", post(login))
//!     .route_layer(middleware::from_fn_with_state(guard, enforce_rate_limit));
//! ```
//!
//! Peer addresses come from `ConnectInfo<SocketAddr>`, so the server must be
//! started with `into_make_service_with_connect_info::<SocketAddr>()`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::limiter::{Decision, RateLimiter, Rejection};
use crate::models::RateLimitedResponse;

/// Key used when the peer address is unavailable.
pub const UNKNOWN_PEER: &str = "unknown";

/// Derives the rate-limit key from an inbound request.
pub type KeyExtractor = Arc<dyn Fn(&Request) -> String + Send + Sync>;

// == Rate Limit Guard ==
/// Middleware state: a limiter plus the rule for keying requests.
#[derive(Clone)]
pub struct RateLimitGuard {
    limiter: RateLimiter,
    key_extractor: KeyExtractor,
}

impl RateLimitGuard {
    /// Keys requests by the caller's IP address.
    pub fn by_peer_addr(limiter: RateLimiter) -> Self {
        Self::with_key_extractor(limiter, peer_ip_key)
    }

    /// Keys requests with a custom function (API key header, user id, ...).
    pub fn with_key_extractor<F>(limiter: RateLimiter, extractor: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        Self {
            limiter,
            key_extractor: Arc::new(extractor),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Default key: the peer IP, without the port.
pub fn peer_ip_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_string())
}

// == Middleware ==
/// Admits or rejects the request, then reports the handler's status.
///
/// Rejected requests get `429` with `{"error", "retryAfter"}` and never reach
/// the handler. If the handler future is dropped before completing, the
/// admission is settled as a failure.
pub async fn enforce_rate_limit(
    State(guard): State<RateLimitGuard>,
    req: Request,
    next: Next,
) -> Response {
    let key = (guard.key_extractor)(&req);

    match guard.limiter.evaluate(&key) {
        Decision::Reject(rejection) => rejection.into_response(),
        Decision::Admit(admission) => {
            let response = next.run(req).await;
            admission.report(response.status().as_u16());
            response
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let retry_after = HeaderValue::from(self.retry_after_secs);
        let body = Json(RateLimitedResponse::new(self.message, self.retry_after_secs));

        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after)],
            body,
        )
            .into_response()
    }
}
