//! Shared fixtures for service tests.

use crate::dto::{AuthResponse, RegisterRequest};
use crate::mail::DisabledMailer;
use crate::{AuthService, AuthServiceImpl, ServiceContext};
use agora_config::{IdentityConfig, MailConfig, SocialConfig};
use agora_core::{UserId, UserRole};
use agora_repository::Repositories;
use agora_security::{Claims, LocalIdentityProvider, PasswordHasher, TokenSubject, TokenType};
use chrono::{Duration, Utc};
use std::sync::Arc;

pub(crate) const PASSWORD: &str = "password1";

pub(crate) fn identity_config() -> IdentityConfig {
    IdentityConfig {
        jwt_secret: "service-test-secret-0123456789abcdefghij".to_string(),
        admin_emails: vec!["admin@example.com".to_string()],
        ..Default::default()
    }
}

/// Identity provider with a cheap password hash.
pub(crate) fn fast_identity() -> Arc<LocalIdentityProvider> {
    Arc::new(LocalIdentityProvider::with_hasher(
        &identity_config(),
        PasswordHasher::with_memory_kib(64),
    ))
}

/// Claims for `uid` without going through sign-in.
pub(crate) fn claims_for(uid: &UserId, role: UserRole) -> Claims {
    Claims::new(
        &TokenSubject {
            uid,
            email: "test@example.com",
            email_verified: true,
            role,
            generation: 0,
        },
        TokenType::Id,
        "agora".to_string(),
        "agora-api".to_string(),
        Utc::now() + Duration::minutes(5),
    )
}

/// In-memory repositories and identity provider with registration helpers.
pub(crate) struct Fixture {
    pub repos: Repositories,
    pub identity: Arc<LocalIdentityProvider>,
    pub social: SocialConfig,
    auth: AuthServiceImpl,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let repos = Repositories::in_memory();
        let identity = fast_identity();
        let auth = AuthServiceImpl::new(
            identity.clone(),
            repos.users.clone(),
            Arc::new(DisabledMailer),
            &identity_config(),
            &MailConfig::default(),
        );
        Self {
            repos,
            identity,
            social: SocialConfig::default(),
            auth,
        }
    }

    pub(crate) fn context(&self) -> ServiceContext {
        ServiceContext::new(self.repos.clone(), self.social.clone())
    }

    pub(crate) async fn register(&self, username: &str) -> AuthResponse {
        self.auth
            .register(RegisterRequest {
                email: format!("{username}@example.com"),
                password: PASSWORD.to_string(),
                username: username.to_string(),
                display_name: username.to_string(),
            })
            .await
            .unwrap()
    }

    /// Registers a user and returns their id.
    pub(crate) async fn user(&self, username: &str) -> UserId {
        self.register(username).await.user.id
    }
}
