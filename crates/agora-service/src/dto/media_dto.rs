//! Media upload DTOs.

use serde::{Deserialize, Serialize};

/// A hosted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUploadResponse {
    pub url: String,
    pub content_type: String,
    pub size: usize,
}
