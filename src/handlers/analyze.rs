//! Image analysis endpoint.
//!
//! `POST /analyze` takes a multipart form with a `file` field and reports
//! dogs and garbage found in it. Detection is not wired in yet, so the
//! result is always empty.
//!
//! # Example
//!
//! ```bash
//! curl -X POST http://localhost:8000/analyze -F "file=@street.jpg"
//! ```

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::error::Result;
use crate::handlers::upload::read_upload;
use crate::models::AnalyzeResponse;
use crate::state::AppState;

/// POST /analyze
async fn analyze(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>> {
    let upload = read_upload(&state.inspector, multipart).await?;

    let response = AnalyzeResponse::empty();

    info!(
        upload_id = %upload.id,
        dogs = response.dogs.count,
        garbage = response.garbage.present,
        "Analyzed upload"
    );

    Ok(Json(response))
}

/// Create analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}
