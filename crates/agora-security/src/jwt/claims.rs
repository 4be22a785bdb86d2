//! JWT claims structure.

use agora_core::{UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account uid).
    pub sub: String,

    /// Account email.
    pub email: String,

    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// Account role.
    pub role: UserRole,

    /// Token type (ID or refresh).
    pub token_type: TokenType,

    /// Token generation of the account when the token was issued.
    ///
    /// Revoking an account's tokens bumps its generation, invalidating
    /// every token that carries an older one.
    pub gen: u64,

    /// Issued at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// JWT ID.
    pub jti: String,
}

/// Identity fields carried into a token.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub uid: &'a UserId,
    pub email: &'a str,
    pub email_verified: bool,
    pub role: UserRole,
    pub generation: u64,
}

impl Claims {
    /// Builds claims for `subject` expiring at `expires_at`.
    #[must_use]
    pub fn new(
        subject: &TokenSubject<'_>,
        token_type: TokenType,
        issuer: String,
        audience: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: subject.uid.to_string(),
            email: subject.email.to_string(),
            email_verified: subject.email_verified,
            role: subject.role,
            token_type,
            gen: subject.generation,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer,
            aud: audience,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// The account uid.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.as_str())
    }

    /// Checks if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Checks if the account has at least the required role.
    #[must_use]
    pub const fn has_role(&self, required: UserRole) -> bool {
        self.role.has_permission(required)
    }

    #[must_use]
    pub const fn is_id_token(&self) -> bool {
        matches!(self.token_type, TokenType::Id)
    }

    #[must_use]
    pub const fn is_refresh_token(&self) -> bool {
        matches!(self.token_type, TokenType::Refresh)
    }
}

/// Token type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived bearer token sent with API requests.
    Id,
    /// Long-lived token exchanged for a new ID token.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(role: UserRole, token_type: TokenType) -> Claims {
        let uid = UserId::new("u1");
        let subject = TokenSubject {
            uid: &uid,
            email: "u1@example.com",
            email_verified: false,
            role,
            generation: 0,
        };
        Claims::new(
            &subject,
            token_type,
            "issuer".to_string(),
            "audience".to_string(),
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn test_id_token_claims() {
        let claims = claims(UserRole::User, TokenType::Id);
        assert!(claims.is_id_token());
        assert!(!claims.is_refresh_token());
        assert!(!claims.is_expired());
        assert_eq!(claims.user_id(), UserId::new("u1"));
    }

    #[test]
    fn test_role_check() {
        let claims = claims(UserRole::Moderator, TokenType::Refresh);
        assert!(claims.has_role(UserRole::User));
        assert!(claims.has_role(UserRole::Moderator));
        assert!(!claims.has_role(UserRole::Admin));
    }
}
