//! # ML Vision Server
//!
//! HTTP endpoints backing the photo checks of the street-report app.
//!
//! ## Endpoints
//!
//! - `GET /health`: readiness probe, always `{"ok": true}`
//! - `POST /analyze`: counts dogs and detects garbage in an uploaded image
//! - `POST /blur`: blurs faces and license plates in an uploaded image
//!
//! Detection and blurring are not wired in yet: `/analyze` always reports
//! nothing found and `/blur` always points at a placeholder location.
//! Uploads are still received and validated, so clients can integrate
//! against the final request/response shapes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │   Trace → Rate limit → CORS → API key → Limits   │
//! ├─────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌────────────┐  │
//! │  │  Health  │   │  Analyze  │   │    Blur    │  │
//! │  └──────────┘   └─────┬─────┘   └──────┬─────┘  │
//! │                       └──── Upload ────┘        │
//! │                           Inspector             │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! curl http://localhost:8000/health
//! curl -X POST http://localhost:8000/analyze -F "file=@street.jpg"
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::StatusCode, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use middleware::{enforce_rate_limit, require_api_key};

/// Run the server with the given configuration until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let bind_address = config.server.bind_address();
    let state = AppState::new(config);

    let app = create_router(state.clone());

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!(address = %listener.local_addr()?, "API server starting");

    if state.rate_limiter.is_enabled() {
        let cleanup_state = state.clone();
        tokio::spawn(async move {
            cleanup_task(cleanup_state).await;
        });
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    if state.auth.is_enabled() {
        info!(
            keys_count = state.auth.key_count(),
            "API key authentication enabled"
        );
    }

    if state.rate_limiter.is_enabled() {
        info!(
            requests_per_window = state.config.rate_limit.requests_per_window,
            window_seconds = state.config.rate_limit.window_seconds,
            "Rate limiting enabled"
        );
    }

    Router::new()
        .merge(handlers::health_routes())
        .merge(handlers::analyze_routes())
        .merge(handlers::blur_routes())
        // Overruns surface as multipart errors, so they render as JSON 413s
        .layer(DefaultBodyLimit::max(state.body_limit()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout(),
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            state.config.server.max_concurrent_requests,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            require_api_key,
        ))
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            enforce_rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Background task dropping idle rate-limiter buckets
async fn cleanup_task(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(state.cleanup_interval()));

    loop {
        interval.tick().await;
        state.rate_limiter.cleanup();
        tracing::debug!(
            clients = state.rate_limiter.tracked_clients(),
            "Rate limiter cleanup"
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
