//! Result returned by `POST /blur`.

use serde::Serialize;

/// Location reported until blurred images are actually stored
pub const PLACEHOLDER_BLURRED_URL: &str = "s3://...";

/// Response body for `POST /blur`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurResponse {
    /// Where the blurred copy lives
    pub blurred_url: String,
    /// Number of faces blurred
    pub faces: u32,
    /// Number of license plates blurred
    pub plates: u32,
}

impl BlurResponse {
    /// Result pointing at the placeholder location with nothing blurred
    pub fn placeholder() -> Self {
        Self {
            blurred_url: PLACEHOLDER_BLURRED_URL.to_string(),
            faces: 0,
            plates: 0,
        }
    }
}
