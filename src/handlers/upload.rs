//! Multipart upload extraction shared by the analysis endpoints.
//!
//! Reads fields until the configured file field (default `file`) is found,
//! enforces the size limit and allow-list, and returns the file as an
//! [`Upload`]. Every failure maps to an [`AppError`]:
//!
//! - body is not multipart, or is malformed: 400
//! - no file field: 400
//! - file above `max_upload_size`: 413
//! - type outside `allowed_types`: 415

use axum::extract::{multipart::MultipartRejection, Multipart};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::Upload;
use crate::services::UploadInspector;

/// Pull the uploaded file out of a multipart request
pub async fn read_upload(
    inspector: &UploadInspector,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Upload> {
    let mut multipart = multipart
        .map_err(|e| AppError::validation(format!("Expected a multipart form: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default();

        if name != inspector.field_name() {
            debug!(field = %name, "Skipping multipart field");
            continue;
        }

        // A plain text part under the file's name is not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            return Err(AppError::validation(format!(
                "Field '{}' must be a file upload",
                inspector.field_name()
            )));
        };
        let declared = field.content_type().map(str::to_string);

        let data = field.bytes().await?;
        inspector.check_size(data.len() as u64)?;

        let content_type =
            inspector.resolve_content_type(&data, declared.as_deref(), &filename);
        inspector.check_type(&content_type)?;

        let upload = Upload::new(filename, content_type, data);
        info!(
            upload_id = %upload.id,
            filename = %upload.filename,
            content_type = %upload.content_type,
            size = upload.len(),
            "Received upload"
        );

        return Ok(upload);
    }

    Err(AppError::validation(format!(
        "No '{}' field found in multipart request",
        inspector.field_name()
    )))
}
