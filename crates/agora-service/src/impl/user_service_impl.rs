//! User service implementation.

use crate::access::blocked_between;
use crate::context::ServiceContext;
use crate::dto::{
    AccountStatusResponse, BlockResponse, ChangePasswordRequest, DeleteAccountRequest,
    FollowResponse, ProfileResponse, UpdateProfileRequest, UserSummary,
};
use crate::user_service::UserService;
use agora_core::{
    AccountStatus, AgoraError, AgoraResult, CursorPage, CursorRequest, Edge, UserId, ValidateExt,
};
use agora_repository::ProfileChanges;
use agora_security::{AuthTokens, IdentityProvider};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Default and largest number of search results.
const SEARCH_DEFAULT_LIMIT: usize = 20;
const SEARCH_MAX_LIMIT: usize = 50;

/// User service implementation.
pub struct UserServiceImpl {
    ctx: ServiceContext,
    identity: Arc<dyn IdentityProvider>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    #[must_use]
    pub fn new(ctx: ServiceContext, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { ctx, identity }
    }

    /// Maps edge pages to the summaries of users visible to `viewer`.
    async fn edge_summaries(
        &self,
        viewer: &UserId,
        page: CursorPage<Edge>,
    ) -> AgoraResult<CursorPage<UserSummary>> {
        let viewer = self.ctx.access.viewer(viewer).await?;
        let ids: Vec<UserId> = page.items.iter().map(|edge| edge.user_id.clone()).collect();
        let mut summaries = self.ctx.access.summaries(&viewer, &ids).await?;

        let items = ids.iter().filter_map(|id| summaries.remove(id)).collect();
        Ok(CursorPage::new(items, page.next_cursor))
    }

    async fn email_of(&self, uid: &UserId) -> AgoraResult<String> {
        self.identity
            .get_account(uid)
            .await?
            .map(|account| account.email)
            .ok_or_else(|| AgoraError::not_found("Account", uid))
    }

    async fn check_password(&self, uid: &UserId, password: &str) -> AgoraResult<()> {
        if self.identity.verify_password(uid, password).await? {
            Ok(())
        } else {
            Err(AgoraError::InvalidCredentials)
        }
    }
}

/// Empty strings clear optional profile fields.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_profile(&self, viewer: &UserId, uid: &UserId) -> AgoraResult<ProfileResponse> {
        debug!("Getting profile {} for {}", uid, viewer);

        let viewer_profile = self.ctx.access.viewer(viewer).await?;
        if viewer == uid {
            return Ok(ProfileResponse::own(viewer_profile));
        }

        let profile = self.ctx.access.visible_user(&viewer_profile, uid).await?;
        let users = &self.ctx.repos.users;
        let (is_following, follows_you) =
            futures::try_join!(users.is_following(viewer, uid), users.is_following(uid, viewer))?;

        Ok(ProfileResponse::public(profile, is_following, follows_you))
    }

    async fn update_profile(&self, uid: &UserId, request: UpdateProfileRequest) -> AgoraResult<ProfileResponse> {
        debug!("Updating profile: {}", uid);

        request.validate_request()?;

        if let Some(url) = request.avatar_url.as_deref().filter(|u| !u.trim().is_empty()) {
            url::Url::parse(url.trim()).map_err(|_| AgoraError::validation("avatar_url: Invalid avatar URL"))?;
        }

        let changes = ProfileChanges {
            username: request.username,
            display_name: request.display_name.map(|name| name.trim().to_string()),
            bio: clearable(request.bio),
            avatar_url: clearable(request.avatar_url),
        };
        if changes.is_empty() {
            let profile = self.ctx.access.viewer(uid).await?;
            return Ok(ProfileResponse::own(profile));
        }

        let profile = self.ctx.repos.users.update_profile(uid, changes).await?;

        info!("Profile updated: {}", uid);
        Ok(ProfileResponse::own(profile))
    }

    async fn search(&self, viewer: &UserId, query: &str, limit: usize) -> AgoraResult<Vec<UserSummary>> {
        let prefix = query.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(AgoraError::validation("Search query is required"));
        }
        let limit = if limit == 0 { SEARCH_DEFAULT_LIMIT } else { limit.min(SEARCH_MAX_LIMIT) };

        let viewer = self.ctx.access.viewer(viewer).await?;
        let found = self
            .ctx
            .repos
            .users
            .search_by_username_prefix(&prefix, limit)
            .await?;

        Ok(found
            .iter()
            .filter(|p| p.id == viewer.id || (p.is_active() && !blocked_between(&viewer, p)))
            .map(UserSummary::from)
            .collect())
    }

    async fn toggle_follow(&self, viewer: &UserId, target: &UserId) -> AgoraResult<FollowResponse> {
        if viewer == target {
            return Err(AgoraError::validation("You cannot follow yourself"));
        }

        let viewer_profile = self.ctx.access.viewer(viewer).await?;
        let target_profile = self
            .ctx
            .repos
            .users
            .find_by_id(target)
            .await?
            .filter(|p| p.is_active())
            .ok_or_else(|| AgoraError::not_found("User", target))?;
        if blocked_between(&viewer_profile, &target_profile) {
            return Err(AgoraError::forbidden("You cannot follow this user"));
        }

        let outcome = self.ctx.repos.users.toggle_follow(viewer, target).await?;

        info!("{} {} {}", viewer, if outcome.active { "followed" } else { "unfollowed" }, target);
        Ok(FollowResponse {
            following: outcome.active,
            follower_count: outcome.count,
        })
    }

    async fn list_followers(
        &self,
        viewer: &UserId,
        uid: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>> {
        let viewer_profile = self.ctx.access.viewer(viewer).await?;
        self.ctx.access.visible_user(&viewer_profile, uid).await?;

        let edges = self.ctx.repos.users.list_followers(uid, page).await?;
        self.edge_summaries(viewer, edges).await
    }

    async fn list_following(
        &self,
        viewer: &UserId,
        uid: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>> {
        let viewer_profile = self.ctx.access.viewer(viewer).await?;
        self.ctx.access.visible_user(&viewer_profile, uid).await?;

        let edges = self.ctx.repos.users.list_following(uid, page).await?;
        self.edge_summaries(viewer, edges).await
    }

    async fn toggle_block(&self, viewer: &UserId, target: &UserId) -> AgoraResult<BlockResponse> {
        if viewer == target {
            return Err(AgoraError::validation("You cannot block yourself"));
        }
        if self.ctx.repos.users.find_by_id(target).await?.is_none() {
            return Err(AgoraError::not_found("User", target));
        }

        let blocked = self.ctx.repos.users.toggle_block(viewer, target).await?;

        info!("{} {} {}", viewer, if blocked { "blocked" } else { "unblocked" }, target);
        Ok(BlockResponse { blocked })
    }

    async fn list_blocked(&self, viewer: &UserId) -> AgoraResult<Vec<UserSummary>> {
        let profile = self.ctx.access.viewer(viewer).await?;
        let blocked = self.ctx.repos.users.find_many(&profile.blocked_users).await?;
        Ok(blocked.into_iter().map(UserSummary::from).collect())
    }

    async fn change_password(&self, uid: &UserId, request: ChangePasswordRequest) -> AgoraResult<AuthTokens> {
        debug!("Changing password for user: {}", uid);

        request.validate_request()?;
        if request.current_password == request.new_password {
            return Err(AgoraError::validation(
                "New password must differ from the current password",
            ));
        }

        self.check_password(uid, &request.current_password).await?;
        self.identity.update_password(uid, &request.new_password).await?;
        self.identity.revoke_refresh_tokens(uid).await?;

        let email = self.email_of(uid).await?;
        let session = self
            .identity
            .sign_in_with_password(&email, &request.new_password)
            .await?;

        info!("Password changed for user: {}", uid);
        Ok(session.tokens)
    }

    async fn deactivate(&self, uid: &UserId) -> AgoraResult<AccountStatusResponse> {
        let profile = self
            .ctx
            .repos
            .users
            .set_status(uid, AccountStatus::Deactivated, None)
            .await?;
        self.identity.revoke_refresh_tokens(uid).await?;

        info!("Account deactivated: {}", uid);
        Ok(AccountStatusResponse::from(&profile))
    }

    async fn request_deletion(&self, uid: &UserId, request: DeleteAccountRequest) -> AgoraResult<AccountStatusResponse> {
        request.validate_request()?;
        self.check_password(uid, &request.password).await?;

        let purge_at = Utc::now() + Duration::days(i64::from(self.ctx.social.deletion_grace_days));
        let profile = self
            .ctx
            .repos
            .users
            .set_status(uid, AccountStatus::PendingDeletion, Some(purge_at))
            .await?;
        self.identity.revoke_refresh_tokens(uid).await?;

        info!("Account {} scheduled for deletion at {}", uid, purge_at);
        Ok(AccountStatusResponse::from(&profile))
    }

    async fn cancel_deletion(&self, uid: &UserId) -> AgoraResult<AccountStatusResponse> {
        let profile = self.ctx.access.viewer(uid).await?;
        if profile.status != AccountStatus::PendingDeletion {
            return Err(AgoraError::business_rule("Account is not scheduled for deletion"));
        }

        let profile = self
            .ctx
            .repos
            .users
            .set_status(uid, AccountStatus::Active, None)
            .await?;

        info!("Deletion cancelled for {}", uid);
        Ok(AccountStatusResponse::from(&profile))
    }
}
