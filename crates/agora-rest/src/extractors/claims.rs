//! Authenticated caller extractor.

use crate::middleware::TokenFailure;
use crate::responses::error_response;
use agora_core::{AgoraError, ErrorResponse, UserId};
use agora_security::Claims;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

/// Claims of the caller, verified by the auth middleware.
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    /// Uid of the caller.
    pub fn uid(&self) -> UserId {
        self.0.user_id()
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection when no verified token accompanies the request.
pub struct AuthError {
    status: StatusCode,
    body: ErrorResponse,
}

impl AuthError {
    fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorResponse::from_error(&AgoraError::unauthorized(message)),
        }
    }
}

impl From<TokenFailure> for AuthError {
    fn from(failure: TokenFailure) -> Self {
        Self {
            status: failure.status,
            body: failure.body,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status, self.body)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AuthError::unauthorized("Missing authorization header"))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(AuthError::unauthorized("Invalid authorization format"));
        }

        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(AuthenticatedUser(claims.clone()));
        }
        Err(match parts.extensions.get::<TokenFailure>() {
            Some(failure) => failure.clone().into(),
            None => AuthError::unauthorized("Invalid or expired token"),
        })
    }
}
