//! Privacy blurring endpoint.
//!
//! `POST /blur` takes a multipart form with a `file` field and answers with
//! the location of a copy with faces and license plates blurred. Nothing is
//! blurred or stored yet; the response points at a placeholder location.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::error::Result;
use crate::handlers::upload::read_upload;
use crate::models::BlurResponse;
use crate::state::AppState;

/// POST /blur
async fn blur(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<BlurResponse>> {
    let upload = read_upload(&state.inspector, multipart).await?;

    let response = BlurResponse::placeholder();

    info!(
        upload_id = %upload.id,
        faces = response.faces,
        plates = response.plates,
        blurred_url = %response.blurred_url,
        "Blurred upload"
    );

    Ok(Json(response))
}

/// Create blur routes
pub fn blur_routes() -> Router<AppState> {
    Router::new().route("/blur", post(blur))
}
