use super::{extension_for, MediaHost, MediaUpload};
use agora_core::AgoraResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// A file held by [`InMemoryMediaHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps uploads in memory and serves them under `base_url`.
#[derive(Debug)]
pub struct InMemoryMediaHost {
    base_url: String,
    files: RwLock<HashMap<String, StoredMedia>>,
}

impl InMemoryMediaHost {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a stored file by key (the last URL segment).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoredMedia> {
        self.files.read().get(key).cloned()
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

#[async_trait]
impl MediaHost for InMemoryMediaHost {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, file: MediaUpload) -> AgoraResult<String> {
        let key = format!("{}{}", Uuid::now_v7().simple(), extension_for(&file.content_type));
        debug!("Storing {} ({} bytes) as {}", file.file_name, file.bytes.len(), key);

        self.files.write().insert(
            key.clone(),
            StoredMedia {
                content_type: file.content_type,
                bytes: file.bytes,
            },
        );
        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_url_under_base() {
        let host = InMemoryMediaHost::new("http://cdn.local/media/");
        let url = host
            .upload(MediaUpload {
                file_name: "cat.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap();

        assert!(url.starts_with("http://cdn.local/media/"));
        assert!(url.ends_with(".png"));

        let key = url.rsplit('/').next().unwrap();
        let stored = host.get(key).unwrap();
        assert_eq!(stored.bytes, vec![1, 2, 3]);
        assert_eq!(host.len(), 1);
    }
}
