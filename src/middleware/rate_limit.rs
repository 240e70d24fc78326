//! Per-client rate limiting.
//!
//! Each client IP gets its own token bucket holding `requests_per_window`
//! tokens that refill evenly over `window_seconds`. Requests over the limit
//! get a 429 with a `Retry-After` header.
//!
//! # Example
//!
//! ```rust,ignore
//! let limiter = RateLimiter::new(&config.rate_limit);
//! let app = Router::new()
//!     .route("/analyze", post(analyze))
//!     .layer(middleware::from_fn_with_state(limiter, enforce_rate_limit));
//! ```

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Rate limiter state shared across requests
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    enabled: bool,
}

impl RateLimiter {
    /// Create a new rate limiter from configuration
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(DefaultKeyedRateLimiter::keyed(quota_for(config))),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Take one token for `ip`. On rejection, returns how long until the
    /// next token is available.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }

        self.limiter
            .check_key(&ip)
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }

    /// Forget clients whose buckets have fully refilled
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// `requests_per_window` tokens, refilled one every `window / requests`
fn quota_for(config: &RateLimitConfig) -> Quota {
    let burst = NonZeroU32::new(config.requests_per_window).unwrap_or(NonZeroU32::MIN);
    let window = Duration::from_secs(config.window_seconds.max(1));

    Quota::with_period(window / burst.get())
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

/// Middleware rejecting clients that exceeded their quota
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    match limiter.check(ip) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            warn!(ip = %ip, "Rate limit exceeded");
            let retry_after = wait.as_secs().max(1).to_string();
            (
                [(header::RETRY_AFTER, retry_after)],
                AppError::rate_limit_exceeded("Too many requests. Please try again later."),
            )
                .into_response()
        }
    }
}

/// Client IP, preferring proxy headers over the socket address
fn client_ip(request: &Request) -> IpAddr {
    let headers = request.headers();

    let forwarded: Option<IpAddr> = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    let socket = || {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip())
    };

    forwarded
        .or_else(real_ip)
        .or_else(socket)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
