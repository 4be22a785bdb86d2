//! `CommentRepositoryImpl`

use super::support::{decode_page, Toggle};
use crate::collections;
use crate::dao::{to_fields, Direction, DocumentStore, Query, WriteOp};
use crate::traits::{CommentRepository, ToggleOutcome};
use agora_core::{
    AgoraError, AgoraResult, Comment, CommentId, ContentId, ContentKind, CursorPage, CursorRequest,
    Edge, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Repository implementation over a [`DocumentStore`].
pub struct CommentRepositoryImpl {
    store: Arc<dyn DocumentStore>,
}

impl CommentRepositoryImpl {
    /// Creates a new `CommentRepositoryImpl` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn comment_not_found() -> AgoraError {
    AgoraError::not_found("Comment", "requested")
}

#[async_trait]
impl CommentRepository for CommentRepositoryImpl {
    async fn add(&self, comment: &Comment) -> AgoraResult<()> {
        debug!("Repository: add comment {} on {} {}", comment.id, comment.kind, comment.content_id);
        let content_path = collections::content(comment.kind, &comment.content_id);
        let mut tx = self.store.begin().await?;
        if tx.get(&content_path).await?.is_none() {
            return Err(AgoraError::not_found(comment.kind.resource_name(), &comment.content_id));
        }
        tx.write(WriteOp::create(
            collections::comment(comment.kind, &comment.content_id, &comment.id),
            comment,
        )?);
        tx.write(WriteOp::increment(content_path, "comment_count", 1));
        tx.commit().await
    }

    async fn find(&self, kind: ContentKind, content_id: &ContentId, id: &CommentId) -> AgoraResult<Option<Comment>> {
        self.store
            .get(&collections::comment(kind, content_id, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn delete(&self, kind: ContentKind, content_id: &ContentId, id: &CommentId) -> AgoraResult<()> {
        let content_path = collections::content(kind, content_id);
        let comment_path = collections::comment(kind, content_id, id);
        let likes_query = Query::collection(comment_path.subcollection(collections::LIKES));

        let mut tx = self.store.begin().await?;
        if tx.get(&comment_path).await?.is_none() {
            return Err(AgoraError::not_found("Comment", id));
        }
        let content_exists = tx.get(&content_path).await?.is_some();
        let likes = tx.query(&likes_query).await?;

        for like in likes {
            tx.write(WriteOp::delete(like.path));
        }
        tx.write(WriteOp::delete(comment_path));
        if content_exists {
            tx.write(WriteOp::increment(content_path, "comment_count", -1));
        }
        tx.commit().await
    }

    async fn list(&self, kind: ContentKind, content_id: &ContentId, page: &CursorRequest) -> AgoraResult<CursorPage<Comment>> {
        let query = Query::collection(collections::content(kind, content_id).subcollection(collections::COMMENTS))
            .order_by("created_at", Direction::Ascending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }

    async fn toggle_like(
        &self,
        kind: ContentKind,
        content_id: &ContentId,
        id: &CommentId,
        user: &UserId,
    ) -> AgoraResult<ToggleOutcome> {
        Toggle {
            parent: collections::comment(kind, content_id, id),
            counter: "like_count",
            marker: collections::comment_like(kind, content_id, id, user),
            marker_fields: to_fields(&Edge::now(user.clone()))?,
            not_found: comment_not_found,
        }
        .run(self.store.as_ref(), |_, _| Ok(Vec::new()))
        .await
    }

    async fn liked_by(
        &self,
        kind: ContentKind,
        content_id: &ContentId,
        ids: &[CommentId],
        user: &UserId,
    ) -> AgoraResult<Vec<bool>> {
        let paths: Vec<_> = ids
            .iter()
            .map(|id| collections::comment_like(kind, content_id, id, user))
            .collect();
        Ok(self
            .store
            .get_all(&paths)
            .await?
            .iter()
            .map(Option::is_some)
            .collect())
    }
}
