//! Content service trait.

use crate::dto::{ContentResponse, CreateContentRequest, UpdateContentRequest};
use agora_core::{AgoraResult, ContentId, ContentKind, CursorPage, CursorRequest, UserId};
use agora_security::Claims;
use async_trait::async_trait;

/// Posts, stories, feelings and the feeds built from them.
#[async_trait]
pub trait ContentService: Send + Sync {
    async fn create(
        &self,
        author: &UserId,
        kind: ContentKind,
        request: CreateContentRequest,
    ) -> AgoraResult<ContentResponse>;

    /// Gets one item. Expired stories and blocked authors are not found.
    async fn get(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<ContentResponse>;

    /// Edits an item. Only the author may edit.
    async fn update(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        request: UpdateContentRequest,
    ) -> AgoraResult<ContentResponse>;

    /// Deletes an item. The author or a moderator may delete.
    async fn delete(&self, caller: &Claims, kind: ContentKind, id: &ContentId) -> AgoraResult<()>;

    /// Items of one author, newest first.
    async fn list_by_author(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        author: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ContentResponse>>;

    /// Posts of the viewer and the authors they follow.
    async fn feed(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>>;

    /// Unexpired stories of the viewer and the authors they follow.
    async fn stories(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>>;

    /// Feelings of the viewer and the authors they follow.
    async fn feelings(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>>;

    /// The viewer's saved items, most recently saved first.
    async fn list_saved(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>>;
}
