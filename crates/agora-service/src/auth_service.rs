//! Authentication service.

use crate::dto::{
    AccountResponse, AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use agora_core::{AgoraResult, UserId};
use agora_security::AuthTokens;
use async_trait::async_trait;

/// Registration, sign-in and credential recovery.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates the identity account and the profile, then signs in.
    async fn register(&self, request: RegisterRequest) -> AgoraResult<AuthResponse>;

    /// Signs in, restoring deactivated or pending-deletion accounts.
    async fn login(&self, request: LoginRequest) -> AgoraResult<AuthResponse>;

    /// Exchanges a refresh token for new tokens.
    async fn refresh(&self, request: RefreshTokenRequest) -> AgoraResult<AuthTokens>;

    /// Revokes every token of the user.
    async fn logout(&self, uid: &UserId) -> AgoraResult<MessageResponse>;

    /// Mails a reset link. The answer is the same whether or not the
    /// account exists.
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> AgoraResult<MessageResponse>;

    /// Sets a new password from a reset token.
    async fn reset_password(&self, request: ResetPasswordRequest) -> AgoraResult<MessageResponse>;

    /// Confirms an email verification token.
    async fn verify_email(&self, request: VerifyEmailRequest) -> AgoraResult<MessageResponse>;

    /// Mails a new verification link.
    async fn resend_verification(&self, uid: &UserId) -> AgoraResult<MessageResponse>;

    /// The signed-in account and its profile.
    async fn me(&self, uid: &UserId) -> AgoraResult<AccountResponse>;
}
