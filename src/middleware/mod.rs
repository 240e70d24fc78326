//! Middleware components for the vision server.
//!
//! - Rate limiting (per client IP)
//! - API key authentication

pub mod auth;
pub mod rate_limit;

pub use auth::{require_api_key, ApiKeyAuth};
pub use rate_limit::{enforce_rate_limit, RateLimiter};
