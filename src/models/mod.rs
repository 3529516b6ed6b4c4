//! Request and Response models for the HTTP surface
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, SetConfigRequest, MAX_KEY_LENGTH};
pub use responses::{
    ConfigValueResponse, DeleteResponse, FibonacciResponse, HealthResponse, RateLimitedResponse,
    ResetResponse, SetResponse, StatsResponse,
};
