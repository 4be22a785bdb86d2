//! User service trait.

use crate::dto::{
    AccountStatusResponse, BlockResponse, ChangePasswordRequest, DeleteAccountRequest,
    FollowResponse, ProfileResponse, UpdateProfileRequest, UserSummary,
};
use agora_core::{AgoraResult, CursorPage, CursorRequest, UserId};
use agora_security::AuthTokens;
use async_trait::async_trait;

/// Profiles, the follow graph, blocks and account lifecycle.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Gets a profile as seen by `viewer`.
    async fn get_profile(&self, viewer: &UserId, uid: &UserId) -> AgoraResult<ProfileResponse>;

    /// Updates the caller's profile.
    async fn update_profile(&self, uid: &UserId, request: UpdateProfileRequest) -> AgoraResult<ProfileResponse>;

    /// Searches active users by username prefix.
    async fn search(&self, viewer: &UserId, query: &str, limit: usize) -> AgoraResult<Vec<UserSummary>>;

    /// Follows or unfollows `target`.
    async fn toggle_follow(&self, viewer: &UserId, target: &UserId) -> AgoraResult<FollowResponse>;

    /// Followers of `uid`.
    async fn list_followers(
        &self,
        viewer: &UserId,
        uid: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>>;

    /// Users `uid` follows.
    async fn list_following(
        &self,
        viewer: &UserId,
        uid: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>>;

    /// Blocks or unblocks `target`.
    async fn toggle_block(&self, viewer: &UserId, target: &UserId) -> AgoraResult<BlockResponse>;

    /// Users the caller blocked.
    async fn list_blocked(&self, viewer: &UserId) -> AgoraResult<Vec<UserSummary>>;

    /// Changes the password and returns fresh tokens; older tokens are revoked.
    async fn change_password(&self, uid: &UserId, request: ChangePasswordRequest) -> AgoraResult<AuthTokens>;

    /// Hides the account until the next sign-in.
    async fn deactivate(&self, uid: &UserId) -> AgoraResult<AccountStatusResponse>;

    /// Schedules the account for deletion after the grace period.
    async fn request_deletion(&self, uid: &UserId, request: DeleteAccountRequest) -> AgoraResult<AccountStatusResponse>;

    /// Cancels a scheduled deletion.
    async fn cancel_deletion(&self, uid: &UserId) -> AgoraResult<AccountStatusResponse>;
}
