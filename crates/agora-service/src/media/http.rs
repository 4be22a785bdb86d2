use super::{MediaHost, MediaUpload};
use agora_core::{AgoraError, AgoraResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "media-host";

/// Forwards uploads to an HTTP image host.
///
/// The file is posted as the `image` field of a multipart form, with the API
/// key in the `key` query parameter. The hosted URL is read from `url` or
/// `data.url` of the JSON reply.
pub struct HttpMediaHost {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMediaHost {
    /// Creates a host client for `endpoint`.
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> AgoraResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgoraError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, endpoint, api_key))
    }

    /// Creates a host client with a preconfigured `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        }
    }
}

impl std::fmt::Debug for HttpMediaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMediaHost")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(&self, file: MediaUpload) -> AgoraResult<String> {
        debug!("Forwarding {} ({} bytes) to {}", file.file_name, file.bytes.len(), self.endpoint);

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| AgoraError::UnsupportedMediaType(e.to_string()))?;
        let form = Form::new().part("image", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgoraError::external(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Media host rejected upload with {}: {}", status, body);
            return Err(AgoraError::external(SERVICE, format!("upload failed with status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgoraError::external(SERVICE, format!("invalid JSON reply: {e}")))?;

        hosted_url(&body)
            .ok_or_else(|| AgoraError::external(SERVICE, "reply carries no URL"))
    }
}

/// Reads the hosted URL from `url` or `data.url`.
fn hosted_url(body: &Value) -> Option<String> {
    body.get("url")
        .or_else(|| body.get("data").and_then(|data| data.get("url")))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hosted_url_shapes() {
        assert_eq!(
            hosted_url(&json!({ "url": "https://img.host/a.png" })).as_deref(),
            Some("https://img.host/a.png")
        );
        assert_eq!(
            hosted_url(&json!({ "data": { "url": "https://img.host/b.png" } })).as_deref(),
            Some("https://img.host/b.png")
        );
        assert!(hosted_url(&json!({ "data": {} })).is_none());
        assert!(hosted_url(&json!({ "url": 7 })).is_none());
    }

    #[test]
    fn test_client_construction() {
        let host = HttpMediaHost::new("https://img.host/upload", None, Duration::from_secs(5)).unwrap();
        assert_eq!(host.name(), "http");
    }
}
