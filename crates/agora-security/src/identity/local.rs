//! In-process identity provider.

use super::{Account, AuthSession, IdentityProvider};
use crate::{AuthTokens, Claims, PasswordHasher, TokenProvider, TokenSubject};
use agora_config::IdentityConfig;
use agora_core::{AgoraError, AgoraResult, UserId, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

struct StoredAccount {
    account: Account,
    password_hash: String,
    generation: u64,
}

impl StoredAccount {
    fn subject(&self) -> TokenSubject<'_> {
        TokenSubject {
            uid: &self.account.uid,
            email: &self.account.email,
            email_verified: self.account.email_verified,
            role: self.account.role,
            generation: self.generation,
        }
    }
}

struct OneTimeToken {
    uid: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<UserId, StoredAccount>,
    by_email: HashMap<String, UserId>,
    reset_tokens: HashMap<String, OneTimeToken>,
    verification_tokens: HashMap<String, OneTimeToken>,
}

impl State {
    fn account_mut(&mut self, uid: &UserId) -> AgoraResult<&mut StoredAccount> {
        self.accounts
            .get_mut(uid)
            .ok_or_else(|| AgoraError::not_found("Account", uid))
    }

    /// Stores a fresh one-time token for `uid`, dropping expired tokens and
    /// any earlier token of the same account.
    fn issue_token(tokens: &mut HashMap<String, OneTimeToken>, uid: UserId, ttl: Duration) -> String {
        let now = Utc::now();
        tokens.retain(|_, t| t.uid != uid && t.expires_at > now);

        let token = random_token();
        tokens.insert(
            token.clone(),
            OneTimeToken {
                uid,
                expires_at: now + ttl,
            },
        );
        token
    }

    fn take_token(tokens: &mut HashMap<String, OneTimeToken>, token: &str) -> AgoraResult<UserId> {
        match tokens.remove(token) {
            Some(t) if t.expires_at > Utc::now() => Ok(t.uid),
            _ => Err(AgoraError::InvalidToken(
                "Token is invalid or has expired".to_string(),
            )),
        }
    }
}

/// Identity provider holding accounts in memory.
///
/// Passwords are Argon2id hashes and tokens are HS256 JWTs. Each account has
/// a token generation; revocation bumps it and verification rejects tokens
/// carrying an older one.
pub struct LocalIdentityProvider {
    state: RwLock<State>,
    tokens: TokenProvider,
    hasher: PasswordHasher,
    reset_ttl: Duration,
    verification_ttl: Duration,
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self::with_hasher(config, PasswordHasher::with_memory_kib(config.password_hash_memory_kib))
    }

    /// Builds a provider with an explicit hasher.
    #[must_use]
    pub fn with_hasher(config: &IdentityConfig, hasher: PasswordHasher) -> Self {
        Self {
            state: RwLock::new(State::default()),
            tokens: TokenProvider::new(config),
            hasher,
            reset_ttl: Duration::seconds(i64::try_from(config.password_reset_ttl_secs).unwrap_or(3600)),
            verification_ttl: Duration::seconds(
                i64::try_from(config.email_verification_ttl_secs).unwrap_or(86_400),
            ),
        }
    }

    fn password_hash_of(&self, uid: &UserId) -> AgoraResult<String> {
        self.state
            .read()
            .accounts
            .get(uid)
            .map(|stored| stored.password_hash.clone())
            .ok_or_else(|| AgoraError::not_found("Account", uid))
    }

    /// Checks that `claims` belong to a live account of the current generation.
    fn check_current(&self, claims: &Claims) -> AgoraResult<()> {
        let state = self.state.read();
        let stored = state
            .accounts
            .get(&claims.user_id())
            .ok_or_else(|| AgoraError::InvalidToken("Account no longer exists".to_string()))?;
        if stored.generation != claims.gen {
            return Err(AgoraError::TokenRevoked);
        }
        if stored.account.disabled {
            return Err(AgoraError::AccountDisabled);
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_account(&self, email: &str, password: &str) -> AgoraResult<Account> {
        let email = normalize_email(email);
        if self.state.read().by_email.contains_key(&email) {
            return Err(AgoraError::conflict("Email is already registered"));
        }
        let password_hash = self.hasher.hash(password)?;

        let mut state = self.state.write();
        if state.by_email.contains_key(&email) {
            return Err(AgoraError::conflict("Email is already registered"));
        }
        let account = Account {
            uid: UserId::generate(),
            email: email.clone(),
            email_verified: false,
            role: UserRole::User,
            disabled: false,
            created_at: Utc::now(),
        };
        state.by_email.insert(email, account.uid.clone());
        state.accounts.insert(
            account.uid.clone(),
            StoredAccount {
                account: account.clone(),
                password_hash,
                generation: 0,
            },
        );

        info!("Created identity account {}", account.uid);
        Ok(account)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AgoraResult<AuthSession> {
        let email = normalize_email(email);
        let (uid, password_hash) = {
            let state = self.state.read();
            let uid = state
                .by_email
                .get(&email)
                .cloned()
                .ok_or(AgoraError::InvalidCredentials)?;
            let hash = state
                .accounts
                .get(&uid)
                .map(|stored| stored.password_hash.clone())
                .ok_or(AgoraError::InvalidCredentials)?;
            (uid, hash)
        };

        if !self.hasher.verify(password, &password_hash)? {
            debug!("Sign-in rejected for {}", uid);
            return Err(AgoraError::InvalidCredentials);
        }

        let state = self.state.read();
        let stored = state
            .accounts
            .get(&uid)
            .ok_or(AgoraError::InvalidCredentials)?;
        if stored.account.disabled {
            return Err(AgoraError::AccountDisabled);
        }
        Ok(AuthSession {
            account: stored.account.clone(),
            tokens: self.tokens.generate_tokens(&stored.subject())?,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> AgoraResult<AuthTokens> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        self.check_current(&claims)?;

        let state = self.state.read();
        let stored = state
            .accounts
            .get(&claims.user_id())
            .ok_or_else(|| AgoraError::InvalidToken("Account no longer exists".to_string()))?;
        self.tokens.generate_tokens(&stored.subject())
    }

    async fn verify_id_token(&self, id_token: &str) -> AgoraResult<Claims> {
        let claims = self.tokens.validate_id_token(id_token)?;
        self.check_current(&claims)?;
        Ok(claims)
    }

    async fn revoke_refresh_tokens(&self, uid: &UserId) -> AgoraResult<()> {
        let mut state = self.state.write();
        let stored = state.account_mut(uid)?;
        stored.generation += 1;
        debug!("Revoked tokens of {} (generation {})", uid, stored.generation);
        Ok(())
    }

    async fn verify_password(&self, uid: &UserId, password: &str) -> AgoraResult<bool> {
        let hash = self.password_hash_of(uid)?;
        self.hasher.verify(password, &hash)
    }

    async fn update_password(&self, uid: &UserId, new_password: &str) -> AgoraResult<()> {
        let password_hash = self.hasher.hash(new_password)?;
        self.state.write().account_mut(uid)?.password_hash = password_hash;
        Ok(())
    }

    async fn delete_account(&self, uid: &UserId) -> AgoraResult<()> {
        let mut state = self.state.write();
        if let Some(stored) = state.accounts.remove(uid) {
            state.by_email.remove(&stored.account.email);
            state.reset_tokens.retain(|_, t| &t.uid != uid);
            state.verification_tokens.retain(|_, t| &t.uid != uid);
            info!("Deleted identity account {}", uid);
        }
        Ok(())
    }

    async fn set_disabled(&self, uid: &UserId, disabled: bool) -> AgoraResult<()> {
        self.state.write().account_mut(uid)?.account.disabled = disabled;
        Ok(())
    }

    async fn set_role(&self, uid: &UserId, role: UserRole) -> AgoraResult<()> {
        self.state.write().account_mut(uid)?.account.role = role;
        Ok(())
    }

    async fn get_account(&self, uid: &UserId) -> AgoraResult<Option<Account>> {
        Ok(self
            .state
            .read()
            .accounts
            .get(uid)
            .map(|stored| stored.account.clone()))
    }

    async fn get_account_by_email(&self, email: &str) -> AgoraResult<Option<Account>> {
        let state = self.state.read();
        Ok(state
            .by_email
            .get(&normalize_email(email))
            .and_then(|uid| state.accounts.get(uid))
            .map(|stored| stored.account.clone()))
    }

    async fn generate_password_reset_token(&self, email: &str) -> AgoraResult<String> {
        let mut state = self.state.write();
        let uid = state
            .by_email
            .get(&normalize_email(email))
            .cloned()
            .ok_or_else(|| AgoraError::not_found("Account", email))?;
        Ok(State::issue_token(&mut state.reset_tokens, uid, self.reset_ttl))
    }

    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AgoraResult<UserId> {
        let uid = State::take_token(&mut self.state.write().reset_tokens, token)?;
        let password_hash = self.hasher.hash(new_password)?;

        let mut state = self.state.write();
        let stored = state.account_mut(&uid)?;
        stored.password_hash = password_hash;
        stored.generation += 1;
        info!("Password reset for {}", uid);
        Ok(uid)
    }

    async fn generate_email_verification_token(&self, uid: &UserId) -> AgoraResult<String> {
        let mut state = self.state.write();
        if !state.accounts.contains_key(uid) {
            return Err(AgoraError::not_found("Account", uid));
        }
        Ok(State::issue_token(
            &mut state.verification_tokens,
            uid.clone(),
            self.verification_ttl,
        ))
    }

    async fn confirm_email_verification(&self, token: &str) -> AgoraResult<UserId> {
        let mut state = self.state.write();
        let uid = State::take_token(&mut state.verification_tokens, token)?;
        state.account_mut(&uid)?.account.email_verified = true;
        Ok(uid)
    }
}
