//! Upload inspection.
//!
//! Decides what kind of file a client sent and whether it is accepted.
//! The content type is resolved from, in order:
//!
//! 1. Magic bytes (`infer`)
//! 2. The part's declared `Content-Type`, unless it is the generic
//!    `application/octet-stream`
//! 3. The filename extension (`mime_guess`)
//! 4. `application/octet-stream`

use tracing::debug;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};

/// Fallback content type when nothing better is known
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Validates uploads against the upload configuration
#[derive(Debug, Clone)]
pub struct UploadInspector {
    config: UploadConfig,
}

impl UploadInspector {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Name of the multipart field carrying the file
    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    /// Maximum accepted file size in bytes
    pub fn max_size(&self) -> u64 {
        self.config.max_upload_size
    }

    /// Resolve the effective content type of an upload
    pub fn resolve_content_type(
        &self,
        data: &[u8],
        declared: Option<&str>,
        filename: &str,
    ) -> String {
        if let Some(kind) = infer::get(data) {
            return kind.mime_type().to_string();
        }

        if let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) {
            if !declared.eq_ignore_ascii_case(OCTET_STREAM) {
                return declared.to_ascii_lowercase();
            }
        }

        mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string()
    }

    /// Reject files above the size limit
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_size() {
            return Err(AppError::payload_too_large(format!(
                "File size {} exceeds maximum allowed size {}",
                size,
                self.max_size()
            )));
        }
        Ok(())
    }

    /// Reject content types outside the allow-list, if one is configured
    pub fn check_type(&self, content_type: &str) -> Result<()> {
        if self.config.is_allowed_type(content_type) {
            return Ok(());
        }

        debug!(content_type = %content_type, "Rejected upload type");
        Err(AppError::unsupported_media_type(format!(
            "Content type {} is not allowed",
            content_type
        )))
    }
}
