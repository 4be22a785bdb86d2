//! Media hosting.
//!
//! Uploaded files are handed to a [`MediaHost`], which stores them and
//! returns a public URL. Two hosts exist:
//!
//! - [`InMemoryMediaHost`] keeps files in process memory (development, tests)
//! - [`HttpMediaHost`] forwards files to a third-party image host

mod http;
mod memory;

pub use http::HttpMediaHost;
pub use memory::{InMemoryMediaHost, StoredMedia};

use agora_config::{MediaBackend, MediaConfig};
use agora_core::{AgoraError, AgoraResult};
use async_trait::async_trait;
use std::sync::Arc;

/// A file ready to be hosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores uploaded files and returns their public URL.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    async fn upload(&self, file: MediaUpload) -> AgoraResult<String>;
}

/// Creates the media host selected by the configuration.
pub fn media_host_from_config(config: &MediaConfig) -> AgoraResult<Arc<dyn MediaHost>> {
    match config.backend {
        MediaBackend::Memory => Ok(Arc::new(InMemoryMediaHost::new(config.public_base_url.clone()))),
        MediaBackend::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                AgoraError::Configuration("media.endpoint is required for the http backend".to_string())
            })?;
            Ok(Arc::new(HttpMediaHost::new(
                endpoint,
                config.api_key.clone(),
                config.timeout(),
            )?))
        }
    }
}

/// File extension for a MIME type, with the leading dot.
pub(crate) fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "video/mp4" => ".mp4",
        _ => "",
    }
}
