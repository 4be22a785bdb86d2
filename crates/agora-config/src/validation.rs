//! Configuration validation.
//!
//! Every problem is collected so that a broken deployment reports all of
//! them at once instead of one per restart.

use crate::{AppConfig, IdentityConfig, MediaBackend, MediaConfig, ObservabilityConfig, ServerConfig, SocialConfig};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is too short.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Port number is invalid.
    InvalidPort { name: String, value: u16 },
    /// A duration or limit that must be positive is zero.
    NonPositive { name: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// HTTP media backend selected without an endpoint.
    MissingMediaEndpoint,
    /// Argon2 memory cost below the safe minimum.
    HashMemoryTooLow { value: u32, minimum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {actual} characters (minimum {minimum})")
            }
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {name}: {value} (must be 1-65535)")
            }
            Self::NonPositive { name } => write!(f, "'{name}' must be positive"),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::MissingMediaEndpoint => {
                write!(f, "media.endpoint is required when media.backend = \"http\"")
            }
            Self::HashMemoryTooLow { value, minimum } => {
                write!(f, "Password hash memory {value} KiB is below the minimum of {minimum} KiB")
            }
            Self::InvalidLogLevel { value } => {
                write!(f, "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)")
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{value}' (valid: pretty, json)")
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum JWT secret length.
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    /// Minimum Argon2 memory cost in KiB.
    const MIN_HASH_MEMORY_KIB: u32 = 8;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    /// Valid log formats.
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_identity(&config.identity, &mut errors);
        Self::validate_social(&config.social, &mut errors);
        Self::validate_mail(&config.mail.public_base_url, &mut errors);
        Self::validate_media(&config.media, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }
        if config.max_body_size == 0 {
            errors.push(non_positive("server.max_body_size"));
        }
    }

    fn validate_identity(config: &IdentityConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: config.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }

        let ttls = [
            ("identity.id_token_ttl_secs", config.id_token_ttl_secs),
            ("identity.refresh_token_ttl_secs", config.refresh_token_ttl_secs),
            ("identity.password_reset_ttl_secs", config.password_reset_ttl_secs),
            ("identity.email_verification_ttl_secs", config.email_verification_ttl_secs),
        ];
        for (name, value) in ttls {
            if value == 0 {
                errors.push(non_positive(name));
            }
        }

        if config.password_hash_memory_kib < Self::MIN_HASH_MEMORY_KIB {
            errors.push(ConfigValidationError::HashMemoryTooLow {
                value: config.password_hash_memory_kib,
                minimum: Self::MIN_HASH_MEMORY_KIB,
            });
        }
    }

    fn validate_social(config: &SocialConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.story_ttl_hours == 0 {
            errors.push(non_positive("social.story_ttl_hours"));
        }
        let limits = [
            ("social.feed_max_authors", config.feed_max_authors),
            ("social.max_text_length", config.max_text_length),
            ("social.max_comment_length", config.max_comment_length),
            ("social.max_message_length", config.max_message_length),
            ("social.max_media_per_post", config.max_media_per_post),
        ];
        for (name, value) in limits {
            if value == 0 {
                errors.push(non_positive(name));
            }
        }
    }

    fn validate_mail(public_base_url: &str, errors: &mut Vec<ConfigValidationError>) {
        if let Err(e) = Url::parse(public_base_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "mail.public_base_url".to_string(),
                message: e.to_string(),
            });
        }
    }

    fn validate_media(config: &MediaConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.max_upload_bytes == 0 {
            errors.push(non_positive("media.max_upload_bytes"));
        }
        if config.backend == MediaBackend::Http {
            match config.endpoint.as_deref() {
                None | Some("") => errors.push(ConfigValidationError::MissingMediaEndpoint),
                Some(endpoint) => {
                    if let Err(e) = Url::parse(endpoint) {
                        errors.push(ConfigValidationError::InvalidUrl {
                            url_type: "media.endpoint".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            if config.timeout_secs == 0 {
                errors.push(non_positive("media.timeout_secs"));
            }
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        if !Self::VALID_LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
        if !Self::VALID_LOG_FORMATS.contains(&config.log_format.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

fn non_positive(name: &str) -> ConfigValidationError {
    ConfigValidationError::NonPositive {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.identity.jwt_secret = "short".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigValidationError::JwtSecretTooShort { actual: 5, minimum: 32 }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidLogLevel { value } if value == "loud")));
    }

    #[test]
    fn test_http_media_requires_endpoint() {
        let mut config = AppConfig::default();
        config.media.backend = MediaBackend::Http;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors, vec![ConfigValidationError::MissingMediaEndpoint]);

        config.media.endpoint = Some("not a url".to_string());
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::InvalidUrl { .. }));

        config.media.endpoint = Some("https://images.example.com/upload".to_string());
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = AppConfig::default();
        config.social.max_comment_length = 0;
        config.identity.password_reset_ttl_secs = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "'identity.password_reset_ttl_secs' must be positive");
    }
}
