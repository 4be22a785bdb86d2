//! `IdentityProvider` trait and account types.

use crate::{AuthTokens, Claims};
use agora_core::{AgoraResult, UserId, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A credential record held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub uid: UserId,
    pub email: String,
    pub email_verified: bool,
    pub role: UserRole,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub tokens: AuthTokens,
}

/// Credential store and token issuer.
///
/// Errors follow [`AgoraError`](agora_core::AgoraError): bad credentials are
/// `InvalidCredentials`, tokens of a revoked generation are `TokenRevoked`,
/// disabled accounts are `AccountDisabled`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account with the `User` role. Fails with `Conflict` when
    /// the email is already registered.
    async fn create_account(&self, email: &str, password: &str) -> AgoraResult<Account>;

    /// Checks the password and issues a token pair.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AgoraResult<AuthSession>;

    /// Exchanges a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> AgoraResult<AuthTokens>;

    /// Verifies an ID token, including the revocation check.
    async fn verify_id_token(&self, id_token: &str) -> AgoraResult<Claims>;

    /// Invalidates every token issued to `uid` so far.
    async fn revoke_refresh_tokens(&self, uid: &UserId) -> AgoraResult<()>;

    /// Whether `password` is the current password of `uid`.
    async fn verify_password(&self, uid: &UserId, password: &str) -> AgoraResult<bool>;

    /// Replaces the password of `uid`.
    async fn update_password(&self, uid: &UserId, new_password: &str) -> AgoraResult<()>;

    /// Removes the account. Missing accounts are ignored.
    async fn delete_account(&self, uid: &UserId) -> AgoraResult<()>;

    /// Enables or disables sign-in for `uid`.
    async fn set_disabled(&self, uid: &UserId, disabled: bool) -> AgoraResult<()>;

    /// Changes the role carried by future tokens of `uid`.
    async fn set_role(&self, uid: &UserId, role: UserRole) -> AgoraResult<()>;

    async fn get_account(&self, uid: &UserId) -> AgoraResult<Option<Account>>;

    async fn get_account_by_email(&self, email: &str) -> AgoraResult<Option<Account>>;

    /// Issues a single-use password reset token. `NotFound` for unknown emails.
    async fn generate_password_reset_token(&self, email: &str) -> AgoraResult<String>;

    /// Consumes a reset token, sets the new password and revokes tokens.
    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AgoraResult<UserId>;

    /// Issues a single-use email verification token.
    async fn generate_email_verification_token(&self, uid: &UserId) -> AgoraResult<String>;

    /// Consumes a verification token and marks the email verified.
    async fn confirm_email_verification(&self, token: &str) -> AgoraResult<UserId>;
}
