//! Health check endpoint.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Readiness probe
///
/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
