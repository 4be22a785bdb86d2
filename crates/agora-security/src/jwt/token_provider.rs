//! JWT token provider for creating and validating tokens.

use super::{Claims, TokenSubject, TokenType};
use agora_config::IdentityConfig;
use agora_core::{AgoraError, AgoraResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use tracing::{debug, warn};

/// Tokens returned by sign-in, refresh and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTokens {
    /// Bearer token for API requests.
    pub id_token: String,
    /// Token exchanged for a new ID token.
    pub refresh_token: String,
    /// ID token lifetime in seconds.
    pub expires_in: i64,
    /// Always "Bearer".
    pub token_type: String,
}

/// JWT token provider service.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    id_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            id_token_ttl: seconds(config.id_token_ttl_secs),
            refresh_token_ttl: seconds(config.refresh_token_ttl_secs),
        }
    }

    /// Generates an ID and refresh token pair.
    pub fn generate_tokens(&self, subject: &TokenSubject<'_>) -> AgoraResult<AuthTokens> {
        Ok(AuthTokens {
            id_token: self.generate(subject, TokenType::Id)?,
            refresh_token: self.generate(subject, TokenType::Refresh)?,
            expires_in: self.id_token_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Generates one token.
    pub fn generate(&self, subject: &TokenSubject<'_>, token_type: TokenType) -> AgoraResult<String> {
        let ttl = match token_type {
            TokenType::Id => self.id_token_ttl,
            TokenType::Refresh => self.refresh_token_ttl,
        };
        let claims = Claims::new(
            subject,
            token_type,
            self.issuer.clone(),
            self.audience.clone(),
            Utc::now() + ttl,
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AgoraError::internal(format!("Failed to generate {token_type} token: {e}")))?;

        debug!("Generated {} token for {}", token_type, subject.uid);
        Ok(token)
    }

    /// Validates signature, issuer, audience and expiry, returning the claims.
    pub fn validate_token(&self, token: &str) -> AgoraResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AgoraError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AgoraError::InvalidToken("Invalid token signature".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AgoraError::InvalidToken("Invalid token issuer".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        AgoraError::InvalidToken("Invalid token audience".to_string())
                    }
                    _ => AgoraError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Validates an ID token specifically.
    pub fn validate_id_token(&self, token: &str) -> AgoraResult<Claims> {
        let claims = self.validate_token(token)?;
        if !claims.is_id_token() {
            return Err(AgoraError::InvalidToken("Expected ID token".to_string()));
        }
        Ok(claims)
    }

    /// Validates a refresh token specifically.
    pub fn validate_refresh_token(&self, token: &str) -> AgoraResult<Claims> {
        let claims = self.validate_token(token)?;
        if !claims.is_refresh_token() {
            return Err(AgoraError::InvalidToken("Expected refresh token".to_string()));
        }
        Ok(claims)
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}
