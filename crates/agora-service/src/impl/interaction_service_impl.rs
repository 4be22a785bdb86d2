//! Interaction service implementation.

use crate::context::ServiceContext;
use crate::dto::{AddCommentRequest, CommentResponse, LikeResponse, SaveResponse, UserSummary};
use crate::interaction_service::InteractionService;
use agora_core::{
    AgoraError, AgoraResult, Comment, CommentId, Content, ContentId, ContentKind, CursorPage,
    CursorRequest, UserId, UserProfile, UserRole, ValidateExt,
};
use agora_security::{Claims, ClaimsExt};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

/// Interaction service implementation.
pub struct InteractionServiceImpl {
    ctx: ServiceContext,
}

impl InteractionServiceImpl {
    /// Creates a new interaction service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Loads live content and checks that the viewer may interact with it.
    /// Content by inactive authors is reported as missing; blocks are `403`.
    async fn interactable(
        &self,
        viewer: &UserProfile,
        kind: ContentKind,
        id: &ContentId,
    ) -> AgoraResult<Content> {
        let content = self
            .ctx
            .repos
            .contents
            .find_by_id(kind, id)
            .await?
            .filter(|c| !c.is_expired_at(Utc::now()))
            .ok_or_else(|| AgoraError::not_found(kind.resource_name(), id))?;

        if content.author_id != viewer.id {
            let author_active = self
                .ctx
                .repos
                .users
                .find_by_id(&content.author_id)
                .await?
                .is_some_and(|author| author.is_active());
            if !author_active {
                return Err(AgoraError::not_found(kind.resource_name(), id));
            }
        }

        self.ctx.access.ensure_can_interact(viewer, &content.author_id).await?;
        Ok(content)
    }

    async fn comment(
        &self,
        kind: ContentKind,
        content_id: &ContentId,
        id: &CommentId,
    ) -> AgoraResult<Comment> {
        self.ctx
            .repos
            .comments
            .find(kind, content_id, id)
            .await?
            .ok_or_else(|| AgoraError::not_found("Comment", id))
    }
}

#[async_trait]
impl InteractionService for InteractionServiceImpl {
    async fn toggle_like(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<LikeResponse> {
        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;

        let outcome = self.ctx.repos.contents.toggle_like(kind, id, viewer).await?;

        debug!("{} like on {} {}: {}", viewer, kind, id, outcome.active);
        Ok(LikeResponse {
            liked: outcome.active,
            like_count: outcome.count,
        })
    }

    async fn toggle_save(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<SaveResponse> {
        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;

        let outcome = self.ctx.repos.contents.toggle_save(kind, id, viewer).await?;

        debug!("{} save on {} {}: {}", viewer, kind, id, outcome.active);
        Ok(SaveResponse {
            saved: outcome.active,
            save_count: outcome.count,
        })
    }

    async fn list_likers(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<UserSummary>> {
        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;

        let edges = self.ctx.repos.contents.list_likers(kind, id, page).await?;
        let ids: Vec<UserId> = edges.items.iter().map(|e| e.user_id.clone()).collect();
        let mut summaries = self.ctx.access.summaries(&profile, &ids).await?;

        let items = ids.iter().filter_map(|uid| summaries.remove(uid)).collect();
        Ok(CursorPage::new(items, edges.next_cursor))
    }

    async fn add_comment(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        request: AddCommentRequest,
    ) -> AgoraResult<CommentResponse> {
        request.validate_request()?;
        let text = request.text.trim().to_string();
        let limit = self.ctx.social.max_comment_length;
        if text.chars().count() > limit {
            return Err(AgoraError::validation(format!(
                "Comment cannot exceed {limit} characters"
            )));
        }

        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;

        let comment = Comment::new(kind, id.clone(), viewer.clone(), text);
        self.ctx.repos.comments.add(&comment).await?;

        info!("Comment {} added to {} {}", comment.id, kind, id);
        Ok(CommentResponse::from_comment(comment, Some((&profile).into()), false))
    }

    async fn list_comments(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<CommentResponse>> {
        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;

        let comments = self.ctx.repos.comments.list(kind, id, page).await?;
        let ids: Vec<CommentId> = comments.items.iter().map(|c| c.id.clone()).collect();
        let authors: Vec<UserId> = comments.items.iter().map(|c| c.author_id.clone()).collect();

        let (liked, summaries) = futures::try_join!(
            self.ctx.repos.comments.liked_by(kind, id, &ids, viewer),
            self.ctx.access.summaries(&profile, &authors),
        )?;

        let items = comments
            .items
            .into_iter()
            .zip(liked)
            .filter_map(|(comment, liked_by_me)| {
                let author = summaries.get(&comment.author_id).cloned()?;
                Some(CommentResponse::from_comment(comment, Some(author), liked_by_me))
            })
            .collect();
        Ok(CursorPage::new(items, comments.next_cursor))
    }

    async fn delete_comment(
        &self,
        caller: &Claims,
        kind: ContentKind,
        id: &ContentId,
        comment_id: &CommentId,
    ) -> AgoraResult<()> {
        let content = self
            .ctx
            .repos
            .contents
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| AgoraError::not_found(kind.resource_name(), id))?;
        let comment = self.comment(kind, id, comment_id).await?;

        if !caller.is_owner(&comment.author_id) {
            caller.require_owner_or_role(&content.author_id, UserRole::Moderator)?;
        }

        self.ctx.repos.comments.delete(kind, id, comment_id).await?;

        info!("Comment {} on {} {} deleted by {}", comment_id, kind, id, caller.sub);
        Ok(())
    }

    async fn toggle_comment_like(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        comment_id: &CommentId,
    ) -> AgoraResult<LikeResponse> {
        let profile = self.ctx.access.viewer(viewer).await?;
        self.interactable(&profile, kind, id).await?;
        let comment = self.comment(kind, id, comment_id).await?;
        self.ctx.access.ensure_can_interact(&profile, &comment.author_id).await?;

        let outcome = self
            .ctx
            .repos
            .comments
            .toggle_like(kind, id, comment_id, viewer)
            .await?;

        Ok(LikeResponse {
            liked: outcome.active,
            like_count: outcome.count,
        })
    }
}
