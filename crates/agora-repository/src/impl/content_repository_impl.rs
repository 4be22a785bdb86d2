//! `ContentRepositoryImpl`: posts, stories and feelings.

use super::support::{decode_page, decode_present, millis, Toggle};
use crate::collections;
use crate::dao::{to_fields, Direction, DocumentStore, Filter, Query, WriteBatch, WriteOp};
use crate::traits::{ContentChanges, ContentRepository, ReactionFlags, ToggleOutcome};
use agora_core::{
    AgoraError, AgoraResult, Content, ContentId, ContentKind, CursorPage, CursorRequest, Edge,
    SavedItem, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Repository implementation over a [`DocumentStore`].
pub struct ContentRepositoryImpl {
    store: Arc<dyn DocumentStore>,
}

impl ContentRepositoryImpl {
    /// Creates a new `ContentRepositoryImpl` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn list(
        &self,
        kind: ContentKind,
        author_filter: Filter,
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Content>> {
        let mut query = Query::collection(kind.collection()).filter(author_filter);
        if let Some(at) = active_at {
            query = query.filter(Filter::gt("expires_at", millis(at)));
        }
        let query = query
            .order_by("created_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }
}

fn post_not_found() -> AgoraError {
    AgoraError::not_found("Post", "requested")
}

fn story_not_found() -> AgoraError {
    AgoraError::not_found("Story", "requested")
}

fn feeling_not_found() -> AgoraError {
    AgoraError::not_found("Feeling", "requested")
}

fn content_not_found(kind: ContentKind) -> fn() -> AgoraError {
    match kind {
        ContentKind::Post => post_not_found,
        ContentKind::Story => story_not_found,
        ContentKind::Feeling => feeling_not_found,
    }
}

#[async_trait]
impl ContentRepository for ContentRepositoryImpl {
    async fn create(&self, content: &Content) -> AgoraResult<()> {
        debug!("Repository: create {} {}", content.kind, content.id);
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::create(collections::content(content.kind, &content.id), content)?);
        if content.kind == ContentKind::Post {
            batch.push(WriteOp::increment(collections::user(&content.author_id), "post_count", 1));
        }
        self.store.commit(batch).await
    }

    async fn find_by_id(&self, kind: ContentKind, id: &ContentId) -> AgoraResult<Option<Content>> {
        self.store
            .get(&collections::content(kind, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn find_many(&self, kind: ContentKind, ids: &[ContentId]) -> AgoraResult<Vec<Content>> {
        let paths: Vec<_> = ids.iter().map(|id| collections::content(kind, id)).collect();
        decode_present(self.store.get_all(&paths).await?)
    }

    async fn update(&self, kind: ContentKind, id: &ContentId, changes: ContentChanges) -> AgoraResult<Content> {
        let path = collections::content(kind, id);
        let mut tx = self.store.begin().await?;
        let mut content: Content = tx
            .get(&path)
            .await?
            .ok_or_else(|| AgoraError::not_found(kind.resource_name(), id))?
            .decode()?;

        if let Some(text) = changes.text {
            content.text = text;
        }
        if let Some(media_urls) = changes.media_urls {
            content.media_urls = media_urls;
        }
        if let Some(feeling) = changes.feeling {
            content.feeling = Some(feeling);
        }
        content.updated_at = Utc::now();

        tx.write(WriteOp::set(path, &content)?);
        tx.commit().await?;
        Ok(content)
    }

    async fn delete(&self, kind: ContentKind, id: &ContentId) -> AgoraResult<()> {
        let path = collections::content(kind, id);

        let mut tx = self.store.begin().await?;
        let content: Content = tx
            .get(&path)
            .await?
            .ok_or_else(|| AgoraError::not_found(kind.resource_name(), id))?
            .decode()?;
        let author = collections::user(&content.author_id);
        let author_exists = kind == ContentKind::Post && tx.get(&author).await?.is_some();

        let likes = tx.query(&Query::collection(path.subcollection(collections::LIKES))).await?;
        let saves = tx.query(&Query::collection(path.subcollection(collections::SAVES))).await?;
        let comments = tx.query(&Query::collection(path.subcollection(collections::COMMENTS))).await?;
        let mut comment_likes = Vec::new();
        for comment in &comments {
            comment_likes.extend(
                tx.query(&Query::collection(comment.path.subcollection(collections::LIKES)))
                    .await?,
            );
        }

        info!(
            "Deleting {} {} with {} likes, {} saves, {} comments",
            kind,
            id,
            likes.len(),
            saves.len(),
            comments.len()
        );

        for doc in likes.iter().chain(comment_likes.iter()).chain(comments.iter()) {
            tx.write(WriteOp::delete(doc.path.clone()));
        }
        for save in &saves {
            let saver = UserId::new(save.id());
            tx.write(WriteOp::delete(save.path.clone()));
            tx.write(WriteOp::delete(collections::saved_item(&saver, kind, id)));
        }
        tx.write(WriteOp::delete(path));
        if author_exists {
            tx.write(WriteOp::increment(author, "post_count", -1));
        }
        tx.commit().await
    }

    async fn list_by_author(
        &self,
        kind: ContentKind,
        author: &UserId,
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Content>> {
        self.list(kind, Filter::eq("author_id", author.as_str()), page, active_at)
            .await
    }

    async fn list_by_authors(
        &self,
        kind: ContentKind,
        authors: &[UserId],
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Content>> {
        if authors.is_empty() {
            return Ok(CursorPage::empty());
        }
        let filter = Filter::one_of("author_id", authors.iter().map(|a| a.as_str().to_string()));
        self.list(kind, filter, page, active_at).await
    }

    async fn toggle_like(&self, kind: ContentKind, id: &ContentId, user: &UserId) -> AgoraResult<ToggleOutcome> {
        debug!("Repository: toggle_like {} {} by {}", kind, id, user);
        Toggle {
            parent: collections::content(kind, id),
            counter: "like_count",
            marker: collections::content_like(kind, id, user),
            marker_fields: to_fields(&Edge::now(user.clone()))?,
            not_found: content_not_found(kind),
        }
        .run(self.store.as_ref(), |_, _| Ok(Vec::new()))
        .await
    }

    async fn toggle_save(&self, kind: ContentKind, id: &ContentId, user: &UserId) -> AgoraResult<ToggleOutcome> {
        debug!("Repository: toggle_save {} {} by {}", kind, id, user);
        let saved_path = collections::saved_item(user, kind, id);
        let content_id = id.clone();
        Toggle {
            parent: collections::content(kind, id),
            counter: "save_count",
            marker: collections::content_save(kind, id, user),
            marker_fields: to_fields(&Edge::now(user.clone()))?,
            not_found: content_not_found(kind),
        }
        .run(self.store.as_ref(), move |saved, parent| {
            if !saved {
                return Ok(vec![WriteOp::delete(saved_path)]);
            }
            let content: Content = parent.decode()?;
            let item = SavedItem {
                kind,
                content_id,
                author_id: content.author_id,
                saved_at: Utc::now(),
            };
            Ok(vec![WriteOp::set(saved_path, &item)?])
        })
        .await
    }

    async fn reactions_of(
        &self,
        kind: ContentKind,
        ids: &[ContentId],
        user: &UserId,
    ) -> AgoraResult<Vec<ReactionFlags>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let like_paths: Vec<_> = ids.iter().map(|id| collections::content_like(kind, id, user)).collect();
        let save_paths: Vec<_> = ids.iter().map(|id| collections::content_save(kind, id, user)).collect();
        let (likes, saves) = futures::try_join!(
            self.store.get_all(&like_paths),
            self.store.get_all(&save_paths),
        )?;
        Ok(likes
            .iter()
            .zip(saves.iter())
            .map(|(like, save)| ReactionFlags {
                liked: like.is_some(),
                saved: save.is_some(),
            })
            .collect())
    }

    async fn list_likers(&self, kind: ContentKind, id: &ContentId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>> {
        let query = Query::collection(collections::content(kind, id).subcollection(collections::LIKES))
            .order_by("created_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{Document, DocumentPath, InMemoryDocumentStore, StoreTransaction};
    use crate::r#impl::UserRepositoryImpl;
    use crate::traits::UserRepository;
    use agora_core::UserProfile;
    use std::future::Future;
    use std::pin::Pin;
    use tokio::task::JoinHandle;

    type Race = Pin<Box<dyn Future<Output = AgoraResult<ToggleOutcome>> + Send>>;

    /// A write queued to start as soon as someone reads a collection.
    #[derive(Default)]
    struct RaceState {
        pending: parking_lot::Mutex<Option<Race>>,
        spawned: parking_lot::Mutex<Option<JoinHandle<AgoraResult<ToggleOutcome>>>>,
    }

    impl RaceState {
        fn fire(&self) {
            if let Some(race) = self.pending.lock().take() {
                *self.spawned.lock() = Some(tokio::spawn(race));
            }
        }
    }

    /// Store that starts the queued write during the first query.
    struct RacingStore {
        inner: Arc<InMemoryDocumentStore>,
        race: Arc<RaceState>,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn get(&self, path: &DocumentPath) -> AgoraResult<Option<Document>> {
            self.inner.get(path).await
        }

        async fn get_all(&self, paths: &[DocumentPath]) -> AgoraResult<Vec<Option<Document>>> {
            self.inner.get_all(paths).await
        }

        async fn query(&self, query: &Query) -> AgoraResult<Vec<Document>> {
            self.race.fire();
            tokio::task::yield_now().await;
            self.inner.query(query).await
        }

        async fn commit(&self, batch: WriteBatch) -> AgoraResult<()> {
            self.inner.commit(batch).await
        }

        async fn begin(&self) -> AgoraResult<Box<dyn StoreTransaction>> {
            Ok(Box::new(RacingTransaction {
                inner: self.inner.begin().await?,
                race: Arc::clone(&self.race),
            }))
        }

        async fn health_check(&self) -> AgoraResult<()> {
            self.inner.health_check().await
        }
    }

    struct RacingTransaction {
        inner: Box<dyn StoreTransaction>,
        race: Arc<RaceState>,
    }

    #[async_trait]
    impl StoreTransaction for RacingTransaction {
        async fn get(&mut self, path: &DocumentPath) -> AgoraResult<Option<Document>> {
            self.inner.get(path).await
        }

        async fn query(&mut self, query: &Query) -> AgoraResult<Vec<Document>> {
            self.race.fire();
            tokio::task::yield_now().await;
            self.inner.query(query).await
        }

        fn write(&mut self, op: WriteOp) {
            self.inner.write(op);
        }

        async fn commit(&mut self) -> AgoraResult<()> {
            self.inner.commit().await
        }
    }

    async fn setup() -> (Arc<InMemoryDocumentStore>, ContentRepositoryImpl, UserRepositoryImpl) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let users = UserRepositoryImpl::new(store.clone());
        for name in ["alice", "bob"] {
            users
                .create(&UserProfile::new(UserId::new(name), name, name, &format!("{name}@example.com")))
                .await
                .unwrap();
        }
        (store.clone(), ContentRepositoryImpl::new(store), users)
    }

    fn post_by(author: &str) -> Content {
        let mut post = Content::new(ContentKind::Post, UserId::new(author));
        post.text = Some("hello".to_string());
        post
    }

    #[tokio::test]
    async fn test_create_post_bumps_post_count() {
        let (_, repo, users) = setup().await;
        let post = post_by("alice");
        repo.create(&post).await.unwrap();

        let alice = users.find_by_id(&UserId::new("alice")).await.unwrap().unwrap();
        assert_eq!(alice.post_count, 1);
        assert_eq!(
            repo.find_by_id(ContentKind::Post, &post.id).await.unwrap().unwrap().text.as_deref(),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_count() {
        let (_, repo, _) = setup().await;
        let post = post_by("alice");
        repo.create(&post).await.unwrap();
        let bob = UserId::new("bob");

        let liked = repo.toggle_like(ContentKind::Post, &post.id, &bob).await.unwrap();
        assert_eq!(liked, ToggleOutcome { active: true, count: 1 });
        let flags = repo.reactions_of(ContentKind::Post, &[post.id.clone()], &bob).await.unwrap();
        assert_eq!(flags, vec![ReactionFlags { liked: true, saved: false }]);

        let unliked = repo.toggle_like(ContentKind::Post, &post.id, &bob).await.unwrap();
        assert_eq!(unliked, ToggleOutcome { active: false, count: 0 });
        let stored = repo.find_by_id(ContentKind::Post, &post.id).await.unwrap().unwrap();
        assert_eq!(stored.like_count, 0);
    }

    #[tokio::test]
    async fn test_toggle_on_missing_content_is_not_found() {
        let (_, repo, _) = setup().await;
        let err = repo
            .toggle_like(ContentKind::Story, &ContentId::new("missing"), &UserId::new("bob"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_maintains_saved_list() {
        let (_, repo, users) = setup().await;
        let post = post_by("alice");
        repo.create(&post).await.unwrap();
        let bob = UserId::new("bob");

        repo.toggle_save(ContentKind::Post, &post.id, &bob).await.unwrap();
        let saved = users.list_saved(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.items[0].author_id, UserId::new("alice"));

        repo.toggle_save(ContentKind::Post, &post.id, &bob).await.unwrap();
        assert!(users.list_saved(&bob, &CursorRequest::first()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (store, repo, users) = setup().await;
        let post = post_by("alice");
        repo.create(&post).await.unwrap();
        let bob = UserId::new("bob");
        repo.toggle_like(ContentKind::Post, &post.id, &bob).await.unwrap();
        repo.toggle_save(ContentKind::Post, &post.id, &bob).await.unwrap();

        repo.delete(ContentKind::Post, &post.id).await.unwrap();

        assert!(repo.find_by_id(ContentKind::Post, &post.id).await.unwrap().is_none());
        assert_eq!(store.count("posts"), 0);
        assert!(users.list_saved(&bob, &CursorRequest::first()).await.unwrap().is_empty());
        let alice = users.find_by_id(&UserId::new("alice")).await.unwrap().unwrap();
        assert_eq!(alice.post_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_delete_is_not_undone_by_a_concurrent_save() {
        let (inner, repo, users) = setup().await;
        let post = post_by("alice");
        repo.create(&post).await.unwrap();
        let bob = UserId::new("bob");

        let race = Arc::new(RaceState::default());
        let saver = ContentRepositoryImpl::new(inner.clone());
        let (post_id, saver_id) = (post.id.clone(), bob.clone());
        *race.pending.lock() = Some(Box::pin(async move {
            saver.toggle_save(ContentKind::Post, &post_id, &saver_id).await
        }));
        let racing = ContentRepositoryImpl::new(Arc::new(RacingStore {
            inner: inner.clone(),
            race: Arc::clone(&race),
        }));

        racing.delete(ContentKind::Post, &post.id).await.unwrap();
        let handle = race.spawned.lock().take().expect("save was started during the delete");
        let save = handle.await.unwrap();

        assert!(save.unwrap_err().is_not_found());
        assert!(repo.find_by_id(ContentKind::Post, &post.id).await.unwrap().is_none());
        assert!(users.list_saved(&bob, &CursorRequest::first()).await.unwrap().is_empty());
        let saves = collections::content(ContentKind::Post, &post.id).subcollection(collections::SAVES);
        assert_eq!(inner.count(&saves), 0);
    }

    #[tokio::test]
    async fn test_active_stories_exclude_expired() {
        let (_, repo, _) = setup().await;
        let now = Utc::now();
        let mut live = Content::new(ContentKind::Story, UserId::new("alice"));
        live.expires_at = Some(now + chrono::Duration::hours(1));
        let mut expired = Content::new(ContentKind::Story, UserId::new("alice"));
        expired.expires_at = Some(now - chrono::Duration::hours(1));
        repo.create(&live).await.unwrap();
        repo.create(&expired).await.unwrap();

        let page = repo
            .list_by_authors(
                ContentKind::Story,
                &[UserId::new("alice"), UserId::new("bob")],
                &CursorRequest::first(),
                Some(now),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.items[0].id, live.id);

        let all = repo
            .list_by_author(ContentKind::Story, &UserId::new("alice"), &CursorRequest::first(), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
