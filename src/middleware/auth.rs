//! API key authentication middleware.
//!
//! When enabled, requests to protected paths must carry one of the
//! configured keys. Paths listed in `public_paths` are never checked.
//!
//! # Authentication Methods
//!
//! Keys are accepted via:
//! 1. `Authorization: Bearer <api_key>` header
//! 2. `X-API-Key: <api_key>` header
//! 3. `?api_key=<api_key>` query parameter

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AppError;

#[derive(Debug)]
struct AuthRules {
    keys: HashSet<String>,
    protected_paths: Vec<String>,
    public_paths: Vec<String>,
}

/// Shared API key checker
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    rules: Arc<AuthRules>,
    enabled: bool,
}

impl ApiKeyAuth {
    /// Create a new API key authenticator from configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            rules: Arc::new(AuthRules {
                keys: config.api_keys.iter().cloned().collect(),
                protected_paths: config.protected_paths.clone(),
                public_paths: config.public_paths.clone(),
            }),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of configured keys
    pub fn key_count(&self) -> usize {
        self.rules.keys.len()
    }

    /// Whether a request to `path` must present a key
    pub fn requires_auth(&self, path: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let rules = &self.rules;
        if rules.public_paths.iter().any(|p| path_matches(path, p)) {
            return false;
        }

        // Empty protected list means everything not public
        rules.protected_paths.is_empty()
            || rules.protected_paths.iter().any(|p| path_matches(path, p))
    }

    pub fn is_valid_key(&self, key: &str) -> bool {
        self.rules.keys.contains(key)
    }
}

/// Middleware rejecting requests to protected paths without a valid key
pub async fn require_api_key(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if !auth.requires_auth(&path) {
        return next.run(request).await;
    }

    match extract_api_key(request.headers(), request.uri()) {
        Some(key) if auth.is_valid_key(&key) => {
            debug!(path = %path, "API key authentication successful");
            next.run(request).await
        }
        Some(_) => {
            warn!(path = %path, "Invalid API key");
            unauthorized("Invalid API key")
        }
        None => {
            warn!(path = %path, "Missing API key");
            unauthorized("API key required")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        [(header::WWW_AUTHENTICATE, "Bearer")],
        AppError::unauthorized(message),
    )
        .into_response()
}

/// Pull the key from the Authorization header, X-API-Key, or the query
fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let api_key_header = || {
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
    };

    // Percent-decoded, so keys with reserved characters survive the URL
    let query = || {
        Query::<ApiKeyQuery>::try_from_uri(uri)
            .ok()?
            .0
            .api_key
    };

    bearer
        .or_else(api_key_header)
        .map(str::to_string)
        .or_else(query)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[derive(Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// `prefix` matches the path itself and anything below it, never a sibling
/// that merely shares its leading characters (`/health` vs `/healthz`)
fn path_matches(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}
