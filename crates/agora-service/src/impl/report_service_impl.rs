//! Moderation report service implementation.

use crate::context::ServiceContext;
use crate::dto::{ReportResponse, SubmitReportRequest};
use crate::report_service::ReportService;
use agora_core::{
    AgoraError, AgoraResult, CommentId, ContentId, ConversationId, CursorPage, CursorRequest,
    MessageId, Report, ReportId, ReportStatus, ReportTargetKind, UserId, UserRole, ValidateExt,
};
use agora_security::{Claims, ClaimsExt};
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

/// Report service implementation.
pub struct ReportServiceImpl {
    ctx: ServiceContext,
}

impl ReportServiceImpl {
    /// Creates a new report service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolves the author of the reported target, checking that it exists
    /// and that the reporter may see it.
    async fn target_owner(&self, reporter: &UserId, request: &SubmitReportRequest) -> AgoraResult<UserId> {
        let target = request.target_id.as_str();
        match request.target_kind {
            ReportTargetKind::User => {
                let user = UserId::new(target);
                self.ctx
                    .repos
                    .users
                    .find_by_id(&user)
                    .await?
                    .ok_or_else(|| AgoraError::not_found("User", target))?;
                Ok(user)
            }
            ReportTargetKind::Comment => {
                let (Some(kind), Some(parent)) = (request.parent_kind, request.parent_id.as_deref()) else {
                    return Err(AgoraError::validation(
                        "Comment reports need parent_kind and parent_id",
                    ));
                };
                let comment = self
                    .ctx
                    .repos
                    .comments
                    .find(kind, &ContentId::new(parent), &CommentId::new(target))
                    .await?
                    .ok_or_else(|| AgoraError::not_found("Comment", target))?;
                Ok(comment.author_id)
            }
            ReportTargetKind::Message => {
                let Some(parent) = request.parent_id.as_deref() else {
                    return Err(AgoraError::validation("Message reports need parent_id"));
                };
                let conversation_id = ConversationId::new(parent);
                let conversation = self
                    .ctx
                    .repos
                    .conversations
                    .find(&conversation_id)
                    .await?
                    .filter(|c| c.has_participant(reporter))
                    .ok_or_else(|| AgoraError::not_found("Conversation", parent))?;
                let message = self
                    .ctx
                    .repos
                    .conversations
                    .find_message(&conversation.id, &MessageId::new(target))
                    .await?
                    .ok_or_else(|| AgoraError::not_found("Message", target))?;
                Ok(message.sender_id)
            }
            kind => {
                let content_kind = kind
                    .content_kind()
                    .ok_or_else(|| AgoraError::internal("Unhandled report target"))?;
                let content = self
                    .ctx
                    .repos
                    .contents
                    .find_by_id(content_kind, &ContentId::new(target))
                    .await?
                    .ok_or_else(|| AgoraError::not_found(content_kind.resource_name(), target))?;
                Ok(content.author_id)
            }
        }
    }
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    async fn submit(&self, reporter: &UserId, request: SubmitReportRequest) -> AgoraResult<ReportResponse> {
        request.validate_request()?;
        self.ctx.access.viewer(reporter).await?;

        let owner = self.target_owner(reporter, &request).await?;
        if &owner == reporter {
            return Err(AgoraError::business_rule("You cannot report yourself or your own content"));
        }

        let now = Utc::now();
        let details = request.details.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        let parent_kind = match request.target_kind {
            ReportTargetKind::Comment => request.parent_kind,
            _ => None,
        };
        let parent_id = match request.target_kind {
            ReportTargetKind::Comment | ReportTargetKind::Message => request.parent_id,
            _ => None,
        };
        let report = Report {
            id: Report::id_for(reporter, request.target_kind, &request.target_id),
            reporter_id: reporter.clone(),
            target_kind: request.target_kind,
            target_id: request.target_id,
            parent_kind,
            parent_id,
            reason: request.reason,
            details,
            status: ReportStatus::Open,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.ctx.repos.reports.create(&report).await?;

        Ok(report.into())
    }

    async fn list(
        &self,
        caller: &Claims,
        status: Option<ReportStatus>,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ReportResponse>> {
        caller.require_role(UserRole::Moderator)?;

        let reports = self.ctx.repos.reports.list(status, page).await?;
        Ok(reports.map(Into::into))
    }

    async fn resolve(&self, caller: &Claims, id: &ReportId, status: ReportStatus) -> AgoraResult<ReportResponse> {
        caller.require_role(UserRole::Moderator)?;
        if status == ReportStatus::Open {
            return Err(AgoraError::validation("A report can only be resolved as reviewed or dismissed"));
        }

        let report = self
            .ctx
            .repos
            .reports
            .update_status(id, status, &caller.user_id())
            .await?;

        info!("Report {} marked {} by {}", id, status.as_str(), caller.sub);
        Ok(report.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims_for, Fixture};
    use agora_core::{Comment, Content, ContentKind, Message, ReportReason};

    fn report(target_kind: ReportTargetKind, target_id: &str) -> SubmitReportRequest {
        SubmitReportRequest {
            target_kind,
            target_id: target_id.to_string(),
            parent_kind: None,
            parent_id: None,
            reason: ReportReason::Spam,
            details: Some("  buy now  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_report_post_once() {
        let fixture = Fixture::new();
        let service = ReportServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let post = Content::new(ContentKind::Post, ada.clone());
        fixture.repos.contents.create(&post).await.unwrap();

        let filed = service
            .submit(&bob, report(ReportTargetKind::Post, post.id.as_str()))
            .await
            .unwrap();
        assert_eq!(filed.status, ReportStatus::Open);
        assert_eq!(filed.details.as_deref(), Some("buy now"));

        let again = service
            .submit(&bob, report(ReportTargetKind::Post, post.id.as_str()))
            .await
            .unwrap_err();
        assert_eq!(again.status_code(), 409);

        let own = service
            .submit(&ada, report(ReportTargetKind::Post, post.id.as_str()))
            .await
            .unwrap_err();
        assert_eq!(own.status_code(), 400);
    }

    #[tokio::test]
    async fn test_report_targets_must_exist() {
        let fixture = Fixture::new();
        let service = ReportServiceImpl::new(fixture.context());
        let bob = fixture.user("bob").await;

        let missing = service
            .submit(&bob, report(ReportTargetKind::Story, "nope"))
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        let orphan = service
            .submit(&bob, report(ReportTargetKind::Comment, "c1"))
            .await
            .unwrap_err();
        assert_eq!(orphan.status_code(), 400);
    }

    #[tokio::test]
    async fn test_report_comment_and_message() {
        let fixture = Fixture::new();
        let service = ReportServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let eve = fixture.user("eve").await;

        let post = Content::new(ContentKind::Post, ada.clone());
        fixture.repos.contents.create(&post).await.unwrap();
        let comment = Comment::new(ContentKind::Post, post.id.clone(), ada.clone(), "rude".into());
        fixture.repos.comments.add(&comment).await.unwrap();

        let mut on_comment = report(ReportTargetKind::Comment, comment.id.as_str());
        on_comment.parent_kind = Some(ContentKind::Post);
        on_comment.parent_id = Some(post.id.to_string());
        service.submit(&bob, on_comment).await.unwrap();

        let conversation = fixture.repos.conversations.get_or_create(&ada, &bob).await.unwrap();
        let message = Message::new(conversation.id.clone(), ada.clone(), Some("spam".into()), None);
        fixture.repos.conversations.append_message(&message).await.unwrap();

        let mut on_message = report(ReportTargetKind::Message, message.id.as_str());
        on_message.parent_id = Some(conversation.id.to_string());
        let outsider = service.submit(&eve, on_message.clone()).await.unwrap_err();
        assert!(outsider.is_not_found());
        service.submit(&bob, on_message).await.unwrap();
    }

    #[tokio::test]
    async fn test_moderation_queue() {
        let fixture = Fixture::new();
        let service = ReportServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let filed = service
            .submit(&bob, report(ReportTargetKind::User, ada.as_str()))
            .await
            .unwrap();

        let user = claims_for(&bob, UserRole::User);
        let denied = service
            .list(&user, None, &CursorRequest::first())
            .await
            .unwrap_err();
        assert_eq!(denied.status_code(), 403);

        let moderator = claims_for(&UserId::new("mod"), UserRole::Moderator);
        let open = service
            .list(&moderator, Some(ReportStatus::Open), &CursorRequest::first())
            .await
            .unwrap();
        assert_eq!(open.items.len(), 1);

        let reopen = service
            .resolve(&moderator, &filed.id, ReportStatus::Open)
            .await
            .unwrap_err();
        assert_eq!(reopen.status_code(), 400);

        let resolved = service
            .resolve(&moderator, &filed.id, ReportStatus::Dismissed)
            .await
            .unwrap();
        assert_eq!(resolved.status, ReportStatus::Dismissed);
        assert_eq!(resolved.reviewed_by, Some(UserId::new("mod")));

        let open = service
            .list(&moderator, Some(ReportStatus::Open), &CursorRequest::first())
            .await
            .unwrap();
        assert!(open.is_empty());
    }
}
