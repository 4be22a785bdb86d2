//! `ReportRepositoryImpl`

use super::support::decode_page;
use crate::collections;
use crate::dao::{DocumentPath, DocumentStore, Direction, Filter, Query, WriteOp};
use crate::traits::ReportRepository;
use agora_core::{
    AgoraError, AgoraResult, CommentId, ContentId, CursorPage, CursorRequest, Report, ReportId,
    ReportStatus, ReportTargetKind, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Repository implementation over a [`DocumentStore`].
pub struct ReportRepositoryImpl {
    store: Arc<dyn DocumentStore>,
}

impl ReportRepositoryImpl {
    /// Creates a new `ReportRepositoryImpl` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

/// Document whose `report_count` a report bumps, if any.
fn counted_target(report: &Report) -> AgoraResult<Option<DocumentPath>> {
    let path = match report.target_kind {
        ReportTargetKind::User => Some(collections::user(&UserId::new(report.target_id.as_str()))),
        ReportTargetKind::Comment => {
            let (Some(kind), Some(parent)) = (report.parent_kind, report.parent_id.as_deref()) else {
                return Err(AgoraError::validation("Comment reports need the parent content"));
            };
            Some(collections::comment(
                kind,
                &ContentId::new(parent),
                &CommentId::new(report.target_id.as_str()),
            ))
        }
        ReportTargetKind::Message => None,
        other => other
            .content_kind()
            .map(|kind| collections::content(kind, &ContentId::new(report.target_id.as_str()))),
    };
    Ok(path)
}

#[async_trait]
impl ReportRepository for ReportRepositoryImpl {
    async fn create(&self, report: &Report) -> AgoraResult<()> {
        let path = collections::report(&report.id);
        let target = counted_target(report)?;

        let mut tx = self.store.begin().await?;
        if tx.get(&path).await?.is_some() {
            return Err(AgoraError::conflict("You have already reported this"));
        }
        if let Some(target) = &target {
            if tx.get(target).await?.is_none() {
                return Err(AgoraError::not_found("Report target", &report.target_id));
            }
        }

        tx.write(WriteOp::create(path, report)?);
        if let Some(target) = target {
            tx.write(WriteOp::increment(target, "report_count", 1));
        }
        tx.commit().await?;

        info!(
            "Report {} filed by {} against {} {}",
            report.id,
            report.reporter_id,
            report.target_kind.as_str(),
            report.target_id
        );
        Ok(())
    }

    async fn find(&self, id: &ReportId) -> AgoraResult<Option<Report>> {
        self.store
            .get(&collections::report(id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn list(&self, status: Option<ReportStatus>, page: &CursorRequest) -> AgoraResult<CursorPage<Report>> {
        let mut query = Query::collection(collections::REPORTS);
        if let Some(status) = status {
            query = query.filter(Filter::eq("status", status.as_str()));
        }
        let query = query
            .order_by("created_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }

    async fn update_status(&self, id: &ReportId, status: ReportStatus, reviewer: &UserId) -> AgoraResult<Report> {
        debug!("Repository: report {} -> {}", id, status.as_str());
        let path = collections::report(id);
        let mut tx = self.store.begin().await?;
        let mut report: Report = tx
            .get(&path)
            .await?
            .ok_or_else(|| AgoraError::not_found("Report", id))?
            .decode()?;

        report.status = status;
        report.reviewed_by = Some(reviewer.clone());
        report.updated_at = Utc::now();

        tx.write(WriteOp::set(path, &report)?);
        tx.commit().await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::InMemoryDocumentStore;
    use crate::r#impl::{ContentRepositoryImpl, UserRepositoryImpl};
    use crate::traits::{ContentRepository, UserRepository};
    use agora_core::{Content, ContentKind, ReportReason, UserProfile};

    fn report(reporter: &str, kind: ReportTargetKind, target: &str) -> Report {
        let reporter = UserId::new(reporter);
        let now = Utc::now();
        Report {
            id: Report::id_for(&reporter, kind, target),
            reporter_id: reporter,
            target_kind: kind,
            target_id: target.to_string(),
            parent_kind: None,
            parent_id: None,
            reason: ReportReason::Spam,
            details: None,
            status: ReportStatus::Open,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_report_once_per_target() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let contents = ContentRepositoryImpl::new(store.clone());
        let repo = ReportRepositoryImpl::new(store);
        let story = Content::new(ContentKind::Story, UserId::new("alice"));
        contents.create(&story).await.unwrap();

        let filed = report("bob", ReportTargetKind::Story, story.id.as_str());
        repo.create(&filed).await.unwrap();
        let err = repo.create(&filed).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");

        let stored = contents.find_by_id(ContentKind::Story, &story.id).await.unwrap().unwrap();
        assert_eq!(stored.report_count, 1);
    }

    #[tokio::test]
    async fn test_user_report_bumps_profile_count() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let users = UserRepositoryImpl::new(store.clone());
        let repo = ReportRepositoryImpl::new(store);
        let alice = UserId::new("alice");
        users
            .create(&UserProfile::new(alice.clone(), "alice", "Alice", "a@example.com"))
            .await
            .unwrap();

        repo.create(&report("bob", ReportTargetKind::User, "alice")).await.unwrap();
        let profile = users.find_by_id(&alice).await.unwrap().unwrap();
        assert_eq!(profile.report_count, 1);
    }

    #[tokio::test]
    async fn test_report_missing_target_is_not_found() {
        let repo = ReportRepositoryImpl::new(Arc::new(InMemoryDocumentStore::new()));
        let err = repo
            .create(&report("bob", ReportTargetKind::User, "ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_comment_report_needs_parent() {
        let repo = ReportRepositoryImpl::new(Arc::new(InMemoryDocumentStore::new()));
        let err = repo
            .create(&report("bob", ReportTargetKind::Comment, "c1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_and_review() {
        let repo = ReportRepositoryImpl::new(Arc::new(InMemoryDocumentStore::new()));
        let first = report("bob", ReportTargetKind::Message, "m1");
        let second = report("carol", ReportTargetKind::Message, "m1");
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let reviewed = repo
            .update_status(&first.id, ReportStatus::Dismissed, &UserId::new("mod"))
            .await
            .unwrap();
        assert_eq!(reviewed.reviewed_by, Some(UserId::new("mod")));

        let open = repo.list(Some(ReportStatus::Open), &CursorRequest::first()).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open.items[0].id, second.id);
        assert_eq!(repo.list(None, &CursorRequest::first()).await.unwrap().len(), 2);
    }
}
