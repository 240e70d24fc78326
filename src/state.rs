//! Application state management.
//!
//! Shared, read-only state handed to every handler through Axum's `State`
//! extractor.

use crate::config::Config;
use crate::middleware::{ApiKeyAuth, RateLimiter};
use crate::services::UploadInspector;
use std::sync::Arc;

/// Shared application state
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Upload size/type validation
    pub inspector: Arc<UploadInspector>,

    /// Per-client request quotas
    pub rate_limiter: RateLimiter,

    /// API key checker
    pub auth: ApiKeyAuth,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        let inspector = UploadInspector::new(&config.upload);
        let rate_limiter = RateLimiter::new(&config.rate_limit);
        let auth = ApiKeyAuth::new(&config.auth);

        Self {
            config: Arc::new(config),
            inspector: Arc::new(inspector),
            rate_limiter,
            auth,
        }
    }

    /// Request body ceiling in bytes
    pub fn body_limit(&self) -> usize {
        self.config.upload.body_limit()
    }

    /// Request timeout
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.server.request_timeout)
    }

    /// Get cleanup interval in seconds
    pub fn cleanup_interval(&self) -> u64 {
        self.config.server.cleanup_interval_seconds.max(1)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"<Config>")
            .field("inspector", &self.inspector)
            .field("rate_limiter", &"<RateLimiter>")
            .field("auth", &self.auth.is_enabled())
            .finish()
    }
}
