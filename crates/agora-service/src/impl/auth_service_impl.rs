//! Authentication service implementation.

use crate::auth_service::AuthService;
use crate::dto::{
    AccountResponse, AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
    ProfileResponse, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    VerifyEmailRequest,
};
use crate::mail::{MailComposer, Mailer};
use agora_config::{IdentityConfig, MailConfig};
use agora_core::{AccountStatus, AgoraError, AgoraResult, UserId, UserProfile, UserRole, ValidateExt};
use agora_repository::UserRepository;
use agora_security::{Account, AuthTokens, IdentityProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for this email, a password reset link has been sent";

/// Authentication service implementation.
pub struct AuthServiceImpl {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    composer: MailComposer,
    identity_config: IdentityConfig,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        identity_config: &IdentityConfig,
        mail_config: &MailConfig,
    ) -> Self {
        Self {
            identity,
            users,
            mailer,
            composer: MailComposer::new(mail_config),
            identity_config: identity_config.clone(),
        }
    }

    /// Mails a verification link. Failures are logged and swallowed.
    async fn send_verification(&self, uid: &UserId, email: &str) {
        let token = match self.identity.generate_email_verification_token(uid).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not issue verification token for {}: {}", uid, e);
                return;
            }
        };
        let message = self.composer.email_verification(email, &token);
        if let Err(e) = self.mailer.send(&message).await {
            warn!("Could not send verification email to {}: {}", uid, e);
        }
    }

    /// Grants the admin role when configured and creates the profile.
    async fn provision(&self, account: &Account, profile: &UserProfile) -> AgoraResult<()> {
        if self.identity_config.is_admin_email(&account.email) {
            self.identity.set_role(&account.uid, UserRole::Admin).await?;
            info!("Granted admin role to {}", account.uid);
        }
        self.users.create(profile).await
    }

    /// Runs [`Self::provision`], deleting the identity account when it fails.
    async fn provision_or_rollback(&self, account: &Account, profile: &UserProfile) -> AgoraResult<()> {
        if let Err(e) = self.provision(account, profile).await {
            warn!("Provisioning failed for {}, removing account: {}", account.uid, e);
            if let Err(cleanup) = self.identity.delete_account(&account.uid).await {
                warn!("Could not remove account {}: {}", account.uid, cleanup);
            }
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest) -> AgoraResult<AuthResponse> {
        debug!("Registering user: {}", request.username);

        request.validate_request()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AgoraError::conflict("Username is already taken"));
        }

        let account = self
            .identity
            .create_account(&request.email, &request.password)
            .await?;

        let profile = UserProfile::new(
            account.uid.clone(),
            &request.username,
            request.display_name.trim(),
            &account.email,
        );
        self.provision_or_rollback(&account, &profile).await?;

        let session = self
            .identity
            .sign_in_with_password(&request.email, &request.password)
            .await?;

        self.send_verification(&account.uid, &account.email).await;

        info!("User registered: {}", account.uid);
        Ok(AuthResponse {
            tokens: session.tokens,
            user: ProfileResponse::own(profile),
            restored: None,
        })
    }

    async fn login(&self, request: LoginRequest) -> AgoraResult<AuthResponse> {
        debug!("Login attempt: {}", request.email);

        request.validate_request()?;

        let session = self
            .identity
            .sign_in_with_password(&request.email, &request.password)
            .await?;
        let uid = session.account.uid;

        let mut profile = self
            .users
            .find_by_id(&uid)
            .await?
            .ok_or_else(|| AgoraError::not_found("User", &uid))?;

        let restored = match profile.status {
            AccountStatus::Active => None,
            previous @ (AccountStatus::Deactivated | AccountStatus::PendingDeletion) => {
                profile = self.users.set_status(&uid, AccountStatus::Active, None).await?;
                info!("Account {} restored from {}", uid, previous);
                Some(previous)
            }
        };

        info!("User logged in: {}", uid);
        Ok(AuthResponse {
            tokens: session.tokens,
            user: ProfileResponse::own(profile),
            restored,
        })
    }

    async fn refresh(&self, request: RefreshTokenRequest) -> AgoraResult<AuthTokens> {
        request.validate_request()?;
        self.identity.refresh(&request.refresh_token).await
    }

    async fn logout(&self, uid: &UserId) -> AgoraResult<MessageResponse> {
        self.identity.revoke_refresh_tokens(uid).await?;
        info!("User logged out: {}", uid);
        Ok(MessageResponse::new("Logged out successfully"))
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> AgoraResult<MessageResponse> {
        request.validate_request()?;

        match self.identity.generate_password_reset_token(&request.email).await {
            Ok(token) => {
                let message = self.composer.password_reset(&request.email, &token);
                if let Err(e) = self.mailer.send(&message).await {
                    warn!("Could not send password reset email: {}", e);
                }
            }
            Err(e) if e.is_not_found() => debug!("Password reset requested for unknown email"),
            Err(e) => warn!("Could not issue password reset token: {}", e),
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> AgoraResult<MessageResponse> {
        request.validate_request()?;

        let uid = self
            .identity
            .confirm_password_reset(&request.token, &request.new_password)
            .await?;

        info!("Password reset for {}", uid);
        Ok(MessageResponse::new("Password has been reset"))
    }

    async fn verify_email(&self, request: VerifyEmailRequest) -> AgoraResult<MessageResponse> {
        request.validate_request()?;

        let uid = self.identity.confirm_email_verification(&request.token).await?;
        info!("Email verified for {}", uid);
        Ok(MessageResponse::new("Email verified"))
    }

    async fn resend_verification(&self, uid: &UserId) -> AgoraResult<MessageResponse> {
        let account = self
            .identity
            .get_account(uid)
            .await?
            .ok_or_else(|| AgoraError::not_found("Account", uid))?;

        if account.email_verified {
            return Ok(MessageResponse::new("Email is already verified"));
        }

        self.send_verification(uid, &account.email).await;
        Ok(MessageResponse::new("Verification email sent"))
    }

    async fn me(&self, uid: &UserId) -> AgoraResult<AccountResponse> {
        let account = self
            .identity
            .get_account(uid)
            .await?
            .ok_or_else(|| AgoraError::not_found("Account", uid))?;
        let profile = self.users.find_by_id(uid).await?;

        Ok(AccountResponse {
            uid: account.uid,
            email: account.email,
            email_verified: account.email_verified,
            role: account.role,
            profile: profile.map(ProfileResponse::own),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MockMailer;
    use crate::test_support::{fast_identity, identity_config};
    use agora_repository::Repositories;

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "password1".to_string(),
            username: username.to_string(),
            display_name: "Ada Lovelace".to_string(),
        }
    }

    fn service(repos: &Repositories, identity: Arc<dyn IdentityProvider>, mailer: MockMailer) -> AuthServiceImpl {
        AuthServiceImpl::new(
            identity,
            repos.users.clone(),
            Arc::new(mailer),
            &identity_config(),
            &MailConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_register_sends_verification_and_signs_in() {
        let repos = Repositories::in_memory();
        let identity = fast_identity();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|m| m.to == "ada@example.com" && m.body.contains("verify-email?token="))
            .times(1)
            .returning(|_| Ok(()));
        let auth = service(&repos, identity.clone(), mailer);

        let response = auth.register(register_request("ada", "ada@example.com")).await.unwrap();

        assert_eq!(response.user.username, "ada");
        assert_eq!(response.user.email.as_deref(), Some("ada@example.com"));
        let claims = identity.verify_id_token(&response.tokens.id_token).await.unwrap();
        assert_eq!(claims.user_id(), response.user.id);
    }

    #[tokio::test]
    async fn test_register_swallows_mail_failure() {
        let repos = Repositories::in_memory();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_| Err(AgoraError::external("mail", "smtp down")));
        let auth = service(&repos, fast_identity(), mailer);

        assert!(auth.register(register_request("ada", "ada@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_taken_username_leaves_no_account() {
        let repos = Repositories::in_memory();
        let identity = fast_identity();
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let auth = service(&repos, identity.clone(), mailer);

        auth.register(register_request("ada", "ada@example.com")).await.unwrap();
        let err = auth
            .register(register_request("ADA", "other@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert!(identity.get_account_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_grants_admin_role() {
        let repos = Repositories::in_memory();
        let identity = fast_identity();
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let auth = service(&repos, identity.clone(), mailer);

        let response = auth.register(register_request("root", "admin@example.com")).await.unwrap();
        let claims = identity.verify_id_token(&response.tokens.id_token).await.unwrap();
        assert_eq!(claims.role, UserRole::Admin);
    }

    mockall::mock! {
        Identity {}

        #[async_trait]
        impl IdentityProvider for Identity {
            async fn create_account(&self, email: &str, password: &str) -> AgoraResult<Account>;
            async fn sign_in_with_password(&self, email: &str, password: &str) -> AgoraResult<agora_security::AuthSession>;
            async fn refresh(&self, refresh_token: &str) -> AgoraResult<AuthTokens>;
            async fn verify_id_token(&self, id_token: &str) -> AgoraResult<agora_security::Claims>;
            async fn revoke_refresh_tokens(&self, uid: &UserId) -> AgoraResult<()>;
            async fn verify_password(&self, uid: &UserId, password: &str) -> AgoraResult<bool>;
            async fn update_password(&self, uid: &UserId, new_password: &str) -> AgoraResult<()>;
            async fn delete_account(&self, uid: &UserId) -> AgoraResult<()>;
            async fn set_disabled(&self, uid: &UserId, disabled: bool) -> AgoraResult<()>;
            async fn set_role(&self, uid: &UserId, role: UserRole) -> AgoraResult<()>;
            async fn get_account(&self, uid: &UserId) -> AgoraResult<Option<Account>>;
            async fn get_account_by_email(&self, email: &str) -> AgoraResult<Option<Account>>;
            async fn generate_password_reset_token(&self, email: &str) -> AgoraResult<String>;
            async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AgoraResult<UserId>;
            async fn generate_email_verification_token(&self, uid: &UserId) -> AgoraResult<String>;
            async fn confirm_email_verification(&self, token: &str) -> AgoraResult<UserId>;
        }
    }

    #[tokio::test]
    async fn test_register_removes_account_when_admin_grant_fails() {
        let repos = Repositories::in_memory();
        let mut identity = MockIdentity::new();
        identity.expect_create_account().times(1).returning(|email, _| {
            Ok(Account {
                uid: UserId::new("root-uid"),
                email: email.to_string(),
                email_verified: false,
                role: UserRole::User,
                disabled: false,
                created_at: chrono::Utc::now(),
            })
        });
        identity
            .expect_set_role()
            .times(1)
            .returning(|_, _| Err(AgoraError::internal("role store unavailable")));
        identity
            .expect_delete_account()
            .withf(|uid| uid.as_str() == "root-uid")
            .times(1)
            .returning(|_| Ok(()));
        identity.expect_sign_in_with_password().never();
        let auth = service(&repos, Arc::new(identity), MockMailer::new());

        let err = auth
            .register(register_request("root", "admin@example.com"))
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert!(repos.users.find_by_username("root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_restores_deactivated_account() {
        let repos = Repositories::in_memory();
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let auth = service(&repos, fast_identity(), mailer);

        let registered = auth.register(register_request("ada", "ada@example.com")).await.unwrap();
        repos
            .users
            .set_status(&registered.user.id, AccountStatus::Deactivated, None)
            .await
            .unwrap();

        let login = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "password1".to_string(),
        };
        let response = auth.login(login.clone()).await.unwrap();
        assert_eq!(response.restored, Some(AccountStatus::Deactivated));
        assert_eq!(response.user.status, AccountStatus::Active);

        let again = auth.login(login).await.unwrap();
        assert!(again.restored.is_none());
    }

    #[tokio::test]
    async fn test_forgot_password_does_not_reveal_accounts() {
        let repos = Repositories::in_memory();
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let auth = service(&repos, fast_identity(), mailer);
        auth.register(register_request("ada", "ada@example.com")).await.unwrap();

        let known = auth
            .forgot_password(ForgotPasswordRequest { email: "ada@example.com".to_string() })
            .await
            .unwrap();
        let unknown = auth
            .forgot_password(ForgotPasswordRequest { email: "nobody@example.com".to_string() })
            .await
            .unwrap();

        assert_eq!(known, unknown);
    }

    #[tokio::test]
    async fn test_logout_revokes_tokens() {
        let repos = Repositories::in_memory();
        let identity = fast_identity();
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_| Ok(()));
        let auth = service(&repos, identity.clone(), mailer);

        let response = auth.register(register_request("ada", "ada@example.com")).await.unwrap();
        auth.logout(&response.user.id).await.unwrap();

        let err = auth
            .refresh(RefreshTokenRequest { refresh_token: response.tokens.refresh_token })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TOKEN_REVOKED");
    }
}
