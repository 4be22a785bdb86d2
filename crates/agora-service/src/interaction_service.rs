//! Interaction service trait.

use crate::dto::{AddCommentRequest, CommentResponse, LikeResponse, SaveResponse, UserSummary};
use agora_core::{AgoraResult, CommentId, ContentId, ContentKind, CursorPage, CursorRequest, UserId};
use agora_security::Claims;
use async_trait::async_trait;

/// Likes, saves and comments.
///
/// Every operation is refused when the viewer and the content author have
/// blocked each other.
#[async_trait]
pub trait InteractionService: Send + Sync {
    async fn toggle_like(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<LikeResponse>;

    async fn toggle_save(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<SaveResponse>;

    /// Users who liked an item, newest first.
    async fn list_likers(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>>;

    async fn add_comment(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        request: AddCommentRequest,
    ) -> AgoraResult<CommentResponse>;

    /// Comments of an item, oldest first.
    async fn list_comments(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<CommentResponse>>;

    /// Deletes a comment. Its author, the content author or a moderator may.
    async fn delete_comment(
        &self,
        caller: &Claims,
        kind: ContentKind,
        id: &ContentId,
        comment_id: &CommentId,
    ) -> AgoraResult<()>;

    async fn toggle_comment_like(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        comment_id: &CommentId,
    ) -> AgoraResult<LikeResponse>;
}
