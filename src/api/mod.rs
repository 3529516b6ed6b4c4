//! API Module
//!
//! HTTP handlers and routing for the demo server.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/fib/:n` - Memoized computation
//! - `GET|PUT|DELETE /api/config/:key` - Config pool access
//! - `GET /admin/stats` - Limiter and cache statistics
//! - `DELETE /admin/rate-limits[/:key]` - Rate limit resets

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
