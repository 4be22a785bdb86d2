//! Bearer token middleware.

use agora_core::{AgoraError, ErrorResponse};
use agora_security::IdentityProvider;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Authentication middleware state.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub identity: Arc<dyn IdentityProvider>,
}

impl AuthMiddlewareState {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }
}

/// Why the bearer token of a request was rejected.
#[derive(Debug, Clone)]
pub struct TokenFailure {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl From<&AgoraError> for TokenFailure {
    fn from(error: &AgoraError) -> Self {
        Self {
            status: StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
            body: ErrorResponse::from_error(error),
        }
    }
}

/// Verifies the bearer ID token, revocation included, and stores its
/// claims in the request extensions.
///
/// Requests without a valid token pass through with a [`TokenFailure`]
/// instead; handlers that need a caller reject them through
/// [`crate::extractors::AuthenticatedUser`].
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.identity.verify_id_token(&token).await {
            Ok(claims) => {
                debug!("Authenticated user: {}", claims.sub);
                request.extensions_mut().insert(claims);
            }
            Err(e) => {
                debug!("Token verification failed: {}", e);
                request.extensions_mut().insert(TokenFailure::from(&e));
            }
        }
    }

    next.run(request).await
}
