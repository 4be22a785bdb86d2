//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity provider configuration.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Social rules: limits, story lifetime, deletion grace period.
    #[serde(default)]
    pub social: SocialConfig,

    /// Outbound mail configuration.
    #[serde(default)]
    pub mail: MailConfig,

    /// Media hosting configuration.
    #[serde(default)]
    pub media: MediaConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "agora".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Enable CORS.
    pub cors_enabled: bool,
    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store.
    #[default]
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which store implementation to use.
    pub backend: StoreBackend,
}

/// Identity provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// HMAC secret for ID and refresh tokens.
    pub jwt_secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// ID token lifetime in seconds.
    pub id_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: u64,
    /// Password reset token lifetime in seconds.
    pub password_reset_ttl_secs: u64,
    /// Email verification token lifetime in seconds.
    pub email_verification_ttl_secs: u64,
    /// Argon2 memory cost in KiB.
    pub password_hash_memory_kib: u32,
    /// Accounts registered with these emails get the admin role.
    pub admin_emails: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production-change-me-in-production".to_string(),
            issuer: "agora".to_string(),
            audience: "agora-api".to_string(),
            id_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 2_592_000,
            password_reset_ttl_secs: 3600,
            email_verification_ttl_secs: 86_400,
            password_hash_memory_kib: 19_456,
            admin_emails: Vec::new(),
        }
    }
}

impl IdentityConfig {
    /// ID token lifetime.
    #[must_use]
    pub const fn id_token_ttl(&self) -> Duration {
        Duration::from_secs(self.id_token_ttl_secs)
    }

    /// Refresh token lifetime.
    #[must_use]
    pub const fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    /// Whether `email` is a bootstrap admin address.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

/// Social rules and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Hours before a story expires.
    pub story_ttl_hours: u32,
    /// Days between a deletion request and the purge.
    pub deletion_grace_days: u32,
    /// Maximum followed authors merged into one feed query.
    pub feed_max_authors: usize,
    /// Maximum characters of post, story and feeling text.
    pub max_text_length: usize,
    /// Maximum characters of a comment.
    pub max_comment_length: usize,
    /// Maximum characters of a direct message.
    pub max_message_length: usize,
    /// Maximum media attachments per content item.
    pub max_media_per_post: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            story_ttl_hours: 24,
            deletion_grace_days: 30,
            feed_max_authors: 30,
            max_text_length: 5000,
            max_comment_length: 1000,
            max_message_length: 2000,
            max_media_per_post: 10,
        }
    }
}

/// Mail backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Write messages to the log.
    #[default]
    Log,
    /// Drop messages.
    Disabled,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub backend: MailBackend,
    /// Sender address.
    pub from_address: String,
    /// Base URL used in reset and verification links.
    pub public_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::Log,
            from_address: "no-reply@agora.local".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Media host backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Keep uploads in process memory.
    #[default]
    Memory,
    /// Forward uploads to an HTTP image host.
    Http,
}

impl fmt::Display for MediaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Media hosting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    /// Upload endpoint of the HTTP host.
    pub endpoint: Option<String>,
    /// API key sent to the HTTP host.
    pub api_key: Option<String>,
    /// Base URL of files kept by the memory host.
    pub public_base_url: String,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Accepted MIME types.
    pub allowed_content_types: Vec<String>,
    /// HTTP host request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::Memory,
            endpoint: None,
            api_key: None,
            public_base_url: "http://localhost:8080/media".to_string(),
            max_upload_bytes: 8 * 1024 * 1024,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
                "video/mp4".to_string(),
            ],
            timeout_secs: 30,
        }
    }
}

impl MediaConfig {
    /// HTTP host request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.social.story_ttl_hours, 24);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.identity.id_token_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_admin_email_match_is_case_insensitive() {
        let identity = IdentityConfig {
            admin_emails: vec!["Root@Agora.dev".to_string()],
            ..IdentityConfig::default()
        };
        assert!(identity.is_admin_email("root@agora.dev"));
        assert!(!identity.is_admin_email("someone@agora.dev"));
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server":{"port":9000},"media":{"backend":"http"}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.media.backend, MediaBackend::Http);
        assert_eq!(config.media.max_upload_bytes, 8 * 1024 * 1024);
    }
}
