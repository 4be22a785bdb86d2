//! Authentication controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use agora_security::AuthTokens;
use agora_service::{
    AccountResponse, AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

/// Creates the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    debug!("Registration request for: {}", request.username);

    let response = state.services.auth.register(request).await?;
    Ok(created(response))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    debug!("Login request for: {}", request.email);

    let response = state.services.auth.login(request).await?;
    ok(response)
}

async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<AuthTokens> {
    let response = state.services.auth.refresh(request).await?;
    ok(response)
}

/// Revokes every refresh token of the caller.
async fn logout(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<MessageResponse> {
    debug!("Logout request for: {}", user.sub);

    let response = state.services.auth.logout(&user.uid()).await?;
    ok(response)
}

async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<MessageResponse> {
    let response = state.services.auth.forgot_password(request).await?;
    ok(response)
}

async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<MessageResponse> {
    let response = state.services.auth.reset_password(request).await?;
    ok(response)
}

async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyEmailRequest>,
) -> ApiResult<MessageResponse> {
    let response = state.services.auth.verify_email(request).await?;
    ok(response)
}

async fn resend_verification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<MessageResponse> {
    let response = state.services.auth.resend_verification(&user.uid()).await?;
    ok(response)
}

async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<AccountResponse> {
    let response = state.services.auth.me(&user.uid()).await?;
    ok(response)
}
