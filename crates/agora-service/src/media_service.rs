//! Media upload service.

use crate::dto::MediaUploadResponse;
use crate::media::{MediaHost, MediaUpload};
use agora_config::MediaConfig;
use agora_core::{AgoraError, AgoraResult, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

#[async_trait]
pub trait MediaService: Send + Sync {
    /// Checks and hosts an uploaded file, returning its URL.
    async fn upload(
        &self,
        uploader: &UserId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AgoraResult<MediaUploadResponse>;
}

/// Media service implementation.
pub struct MediaServiceImpl {
    host: Arc<dyn MediaHost>,
    max_upload_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl MediaServiceImpl {
    /// Creates a new media service.
    #[must_use]
    pub fn new(host: Arc<dyn MediaHost>, config: &MediaConfig) -> Self {
        Self {
            host,
            max_upload_bytes: config.max_upload_bytes,
            allowed_content_types: config.allowed_content_types.clone(),
        }
    }

    fn check(&self, content_type: &str, size: usize) -> AgoraResult<()> {
        if size == 0 {
            return Err(AgoraError::validation("Uploaded file is empty"));
        }
        if size > self.max_upload_bytes {
            return Err(AgoraError::PayloadTooLarge(format!(
                "File is {size} bytes, the limit is {} bytes",
                self.max_upload_bytes
            )));
        }
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
        {
            return Err(AgoraError::UnsupportedMediaType(format!(
                "{content_type} is not accepted"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaService for MediaServiceImpl {
    async fn upload(
        &self,
        uploader: &UserId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AgoraResult<MediaUploadResponse> {
        debug!("Upload from {}: {} ({})", uploader, file_name, content_type);

        let size = bytes.len();
        self.check(content_type, size)?;

        let url = self
            .host
            .upload(MediaUpload {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                bytes,
            })
            .await?;

        info!("Media uploaded by {} to {} host: {}", uploader, self.host.name(), url);
        Ok(MediaUploadResponse {
            url,
            content_type: content_type.to_string(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::InMemoryMediaHost;

    fn service(host: Arc<InMemoryMediaHost>) -> MediaServiceImpl {
        let config = MediaConfig {
            max_upload_bytes: 4,
            ..Default::default()
        };
        MediaServiceImpl::new(host, &config)
    }

    #[tokio::test]
    async fn test_upload_stores_accepted_file() {
        let host = Arc::new(InMemoryMediaHost::new("http://cdn.local"));
        let response = service(host.clone())
            .upload(&UserId::new("u1"), "a.jpg", "image/jpeg", vec![1, 2])
            .await
            .unwrap();

        assert_eq!(response.size, 2);
        assert!(response.url.ends_with(".jpg"));
        assert_eq!(host.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_limits() {
        let host = Arc::new(InMemoryMediaHost::new("http://cdn.local"));
        let service = service(host.clone());
        let uid = UserId::new("u1");

        let too_big = service.upload(&uid, "a.png", "image/png", vec![0; 5]).await.unwrap_err();
        assert_eq!(too_big.status_code(), 413);

        let wrong_type = service.upload(&uid, "a.txt", "text/plain", vec![1]).await.unwrap_err();
        assert_eq!(wrong_type.status_code(), 415);

        let empty = service.upload(&uid, "a.png", "image/png", Vec::new()).await.unwrap_err();
        assert_eq!(empty.status_code(), 400);

        assert!(host.is_empty());
    }
}
