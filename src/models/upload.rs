//! A file received through a multipart form.

use bytes::Bytes;
use uuid::Uuid;

/// One uploaded file, held in memory for the duration of a request
#[derive(Debug, Clone)]
pub struct Upload {
    /// Per-request identifier, used to correlate log lines
    pub id: Uuid,
    /// Client-supplied filename from the multipart part
    pub filename: String,
    /// Content type resolved by the upload inspector
    pub content_type: String,
    /// Raw file bytes
    pub data: Bytes,
}

impl Upload {
    /// Create a new upload with a fresh id
    pub fn new(filename: String, content_type: String, data: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            content_type,
            data,
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
