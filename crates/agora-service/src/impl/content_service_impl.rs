//! Content service implementation.

use crate::access::blocked_between;
use crate::content_service::ContentService;
use crate::context::ServiceContext;
use crate::dto::{ContentResponse, CreateContentRequest, UpdateContentRequest};
use agora_core::{
    AgoraError, AgoraResult, Content, ContentId, ContentKind, CursorPage, CursorRequest,
    UserId, UserProfile, UserRole, ValidateExt,
};
use agora_repository::{ContentChanges, ReactionFlags};
use agora_security::{Claims, ClaimsExt};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

/// Content service implementation.
pub struct ContentServiceImpl {
    ctx: ServiceContext,
}

fn content_not_found(kind: ContentKind, id: &ContentId) -> AgoraError {
    AgoraError::not_found(kind.resource_name(), id)
}

/// Trims text, treating blank text as absent.
fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl ContentServiceImpl {
    /// Creates a new content service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Checks the body of a post, story or feeling against the kind's rules.
    fn check_body(
        &self,
        kind: ContentKind,
        text: Option<&str>,
        media_urls: &[String],
        feeling: Option<&str>,
    ) -> AgoraResult<()> {
        let social = &self.ctx.social;
        if text.is_some_and(|t| t.chars().count() > social.max_text_length) {
            return Err(AgoraError::validation(format!(
                "Text cannot exceed {} characters",
                social.max_text_length
            )));
        }
        if media_urls.len() > social.max_media_per_post {
            return Err(AgoraError::validation(format!(
                "At most {} media items are allowed",
                social.max_media_per_post
            )));
        }
        if let Some(bad) = media_urls.iter().find(|u| url::Url::parse(u).is_err()) {
            return Err(AgoraError::validation(format!("Invalid media URL: {bad}")));
        }

        match kind {
            ContentKind::Post | ContentKind::Story if feeling.is_some() => {
                Err(AgoraError::validation("Only feelings carry a feeling label"))
            }
            ContentKind::Post | ContentKind::Story if text.is_none() && media_urls.is_empty() => {
                Err(AgoraError::validation(format!("A {kind} needs text or media")))
            }
            ContentKind::Feeling if feeling.map_or(true, |f| f.trim().is_empty()) => {
                Err(AgoraError::validation("A feeling needs a feeling label"))
            }
            _ => Ok(()),
        }
    }

    /// Loads content the viewer may see.
    async fn visible_content(
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
            .ok_or_else(|| content_not_found(kind, id))?;

        match self.ctx.access.visible_user(viewer, &content.author_id).await {
            Ok(_) => Ok(content),
            Err(e) if e.is_not_found() => Err(content_not_found(kind, id)),
            Err(e) => Err(e),
        }
    }

    /// The viewer plus the visible authors they follow.
    async fn feed_authors(&self, viewer: &UserProfile) -> AgoraResult<Vec<UserId>> {
        let followed = self
            .ctx
            .repos
            .users
            .following_ids(&viewer.id, self.ctx.social.feed_max_authors)
            .await?;
        let profiles = self.ctx.repos.users.find_many(&followed).await?;

        let mut authors = vec![viewer.id.clone()];
        authors.extend(
            profiles
                .into_iter()
                .filter(|p| p.is_active() && !blocked_between(viewer, p))
                .map(|p| p.id),
        );
        Ok(authors)
    }

    async fn feed_of(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<ContentResponse>> {
        let viewer = self.ctx.access.viewer(viewer).await?;
        let authors = self.feed_authors(&viewer).await?;
        debug!("Building {} feed for {} from {} authors", kind, viewer.id, authors.len());

        let contents = self
            .ctx
            .repos
            .contents
            .list_by_authors(kind, &authors, page, active_at)
            .await?;
        self.present_page(&viewer, contents).await
    }

    async fn present_page(
        &self,
        viewer: &UserProfile,
        page: CursorPage<Content>,
    ) -> AgoraResult<CursorPage<ContentResponse>> {
        let items = self.present(viewer, page.items).await?;
        Ok(CursorPage::new(items, page.next_cursor))
    }

    /// Adds authors and the viewer's reactions. Items by authors hidden
    /// from the viewer are dropped.
    async fn present(&self, viewer: &UserProfile, contents: Vec<Content>) -> AgoraResult<Vec<ContentResponse>> {
        let author_ids: Vec<UserId> = contents.iter().map(|c| c.author_id.clone()).collect();
        let authors = self.ctx.access.summaries(viewer, &author_ids).await?;

        let mut flags: HashMap<(ContentKind, ContentId), ReactionFlags> = HashMap::new();
        for kind in ContentKind::ALL {
            let ids: Vec<ContentId> = contents
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.id.clone())
                .collect();
            if ids.is_empty() {
                continue;
            }
            let reactions = self
                .ctx
                .repos
                .contents
                .reactions_of(kind, &ids, &viewer.id)
                .await?;
            flags.extend(ids.into_iter().map(|id| (kind, id)).zip(reactions));
        }

        Ok(contents
            .into_iter()
            .filter_map(|content| {
                let author = authors.get(&content.author_id).cloned()?;
                let reaction = flags
                    .get(&(content.kind, content.id.clone()))
                    .copied()
                    .unwrap_or_default();
                Some(ContentResponse::from_content(content, Some(author), reaction))
            })
            .collect())
    }
}

#[async_trait]
impl ContentService for ContentServiceImpl {
    async fn create(
        &self,
        author: &UserId,
        kind: ContentKind,
        request: CreateContentRequest,
    ) -> AgoraResult<ContentResponse> {
        debug!("Creating {} for {}", kind, author);

        request.validate_request()?;
        let profile = self.ctx.access.viewer(author).await?;

        let text = normalize_text(request.text);
        let feeling = request.feeling.map(|f| f.trim().to_string());
        self.check_body(kind, text.as_deref(), &request.media_urls, feeling.as_deref())?;

        let mut content = Content::new(kind, author.clone());
        content.text = text;
        content.media_urls = request.media_urls;
        content.feeling = feeling;
        if kind == ContentKind::Story {
            content.expires_at =
                Some(content.created_at + Duration::hours(i64::from(self.ctx.social.story_ttl_hours)));
        }

        self.ctx.repos.contents.create(&content).await?;

        info!("{} created: {}", kind.resource_name(), content.id);
        Ok(ContentResponse::from_content(
            content,
            Some((&profile).into()),
            ReactionFlags::default(),
        ))
    }

    async fn get(&self, viewer: &UserId, kind: ContentKind, id: &ContentId) -> AgoraResult<ContentResponse> {
        let viewer = self.ctx.access.viewer(viewer).await?;
        let content = self.visible_content(&viewer, kind, id).await?;

        self.present(&viewer, vec![content])
            .await?
            .pop()
            .ok_or_else(|| content_not_found(kind, id))
    }

    async fn update(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        id: &ContentId,
        request: UpdateContentRequest,
    ) -> AgoraResult<ContentResponse> {
        debug!("Updating {} {}", kind, id);

        request.validate_request()?;
        let profile = self.ctx.access.viewer(viewer).await?;
        let current = self
            .ctx
            .repos
            .contents
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| content_not_found(kind, id))?;
        if !current.is_authored_by(viewer) {
            return Err(AgoraError::forbidden(format!("You can only edit your own {kind}")));
        }

        let text = request.text.map(|t| normalize_text(Some(t)));
        let feeling = request.feeling.map(|f| f.trim().to_string());
        let merged_text = text.clone().unwrap_or_else(|| current.text.clone());
        let merged_media = request.media_urls.as_ref().unwrap_or(&current.media_urls);
        let merged_feeling = feeling.clone().or_else(|| current.feeling.clone());
        self.check_body(kind, merged_text.as_deref(), merged_media, merged_feeling.as_deref())?;

        let changes = ContentChanges {
            text,
            media_urls: request.media_urls,
            feeling,
        };
        let updated = self.ctx.repos.contents.update(kind, id, changes).await?;

        let flags = self
            .ctx
            .repos
            .contents
            .reactions_of(kind, std::slice::from_ref(id), viewer)
            .await?
            .pop()
            .unwrap_or_default();

        info!("{} updated: {}", kind.resource_name(), id);
        Ok(ContentResponse::from_content(updated, Some((&profile).into()), flags))
    }

    async fn delete(&self, caller: &Claims, kind: ContentKind, id: &ContentId) -> AgoraResult<()> {
        let content = self
            .ctx
            .repos
            .contents
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| content_not_found(kind, id))?;
        caller.require_owner_or_role(&content.author_id, UserRole::Moderator)?;

        self.ctx.repos.contents.delete(kind, id).await?;

        info!("{} {} deleted by {}", kind.resource_name(), id, caller.sub);
        Ok(())
    }

    async fn list_by_author(
        &self,
        viewer: &UserId,
        kind: ContentKind,
        author: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ContentResponse>> {
        let viewer = self.ctx.access.viewer(viewer).await?;
        self.ctx.access.visible_user(&viewer, author).await?;

        let active_at = (kind == ContentKind::Story).then(Utc::now);
        let contents = self
            .ctx
            .repos
            .contents
            .list_by_author(kind, author, page, active_at)
            .await?;
        self.present_page(&viewer, contents).await
    }

    async fn feed(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>> {
        self.feed_of(viewer, ContentKind::Post, page, None).await
    }

    async fn stories(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>> {
        self.feed_of(viewer, ContentKind::Story, page, Some(Utc::now())).await
    }

    async fn feelings(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>> {
        self.feed_of(viewer, ContentKind::Feeling, page, None).await
    }

    async fn list_saved(&self, viewer: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ContentResponse>> {
        let viewer = self.ctx.access.viewer(viewer).await?;
        let saved = self.ctx.repos.users.list_saved(&viewer.id, page).await?;

        let mut found: HashMap<(ContentKind, ContentId), Content> = HashMap::new();
        for kind in ContentKind::ALL {
            let ids: Vec<ContentId> = saved
                .items
                .iter()
                .filter(|item| item.kind == kind)
                .map(|item| item.content_id.clone())
                .collect();
            if ids.is_empty() {
                continue;
            }
            for content in self.ctx.repos.contents.find_many(kind, &ids).await? {
                found.insert((kind, content.id.clone()), content);
            }
        }

        let now = Utc::now();
        let contents: Vec<Content> = saved
            .items
            .iter()
            .filter_map(|item| found.remove(&(item.kind, item.content_id.clone())))
            .filter(|content| !content.is_expired_at(now))
            .collect();

        let items = self.present(&viewer, contents).await?;
        Ok(CursorPage::new(items, saved.next_cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims_for, Fixture};
    use crate::UserService;
    use crate::UserServiceImpl;

    fn service(fixture: &Fixture) -> ContentServiceImpl {
        ContentServiceImpl::new(fixture.context())
    }

    fn text(body: &str) -> CreateContentRequest {
        CreateContentRequest {
            text: Some(body.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_kind_rules() {
        let fixture = Fixture::new();
        let contents = service(&fixture);
        let ada = fixture.user("ada").await;

        let empty_post = contents
            .create(&ada, ContentKind::Post, text("   "))
            .await
            .unwrap_err();
        assert_eq!(empty_post.status_code(), 400);

        let no_label = contents
            .create(&ada, ContentKind::Feeling, text("meh"))
            .await
            .unwrap_err();
        assert_eq!(no_label.status_code(), 400);

        let feeling = contents
            .create(&ada, ContentKind::Feeling, CreateContentRequest {
                feeling: Some("happy".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(feeling.feeling.as_deref(), Some("happy"));

        let story = contents
            .create(&ada, ContentKind::Story, CreateContentRequest {
                media_urls: vec!["https://img.host/s.png".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        let ttl = story.expires_at.unwrap() - story.created_at;
        assert_eq!(ttl, Duration::hours(24));

        let bad_url = contents
            .create(&ada, ContentKind::Post, CreateContentRequest {
                media_urls: vec!["not a url".to_string()],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(bad_url.status_code(), 400);
    }

    #[tokio::test]
    async fn test_text_length_limit() {
        let mut fixture = Fixture::new();
        fixture.social.max_text_length = 5;
        let contents = service(&fixture);
        let ada = fixture.user("ada").await;

        assert!(contents.create(&ada, ContentKind::Post, text("12345")).await.is_ok());
        assert!(contents.create(&ada, ContentKind::Post, text("123456")).await.is_err());
    }

    #[tokio::test]
    async fn test_feed_includes_followed_and_excludes_blocked() {
        let fixture = Fixture::new();
        let contents = service(&fixture);
        let users = UserServiceImpl::new(fixture.context(), fixture.identity.clone());
        let viewer = fixture.user("viewer").await;
        let friend = fixture.user("friend").await;
        let stranger = fixture.user("stranger").await;
        let ex = fixture.user("ex").await;

        users.toggle_follow(&viewer, &friend).await.unwrap();
        users.toggle_follow(&viewer, &ex).await.unwrap();
        contents.create(&viewer, ContentKind::Post, text("mine")).await.unwrap();
        contents.create(&friend, ContentKind::Post, text("friend's")).await.unwrap();
        contents.create(&stranger, ContentKind::Post, text("stranger's")).await.unwrap();
        contents.create(&ex, ContentKind::Post, text("ex's")).await.unwrap();
        users.toggle_block(&ex, &viewer).await.unwrap();

        let feed = contents.feed(&viewer, &CursorRequest::first()).await.unwrap();
        let mut texts: Vec<_> = feed.items.iter().filter_map(|c| c.text.clone()).collect();
        texts.sort();
        assert_eq!(texts, vec!["friend's".to_string(), "mine".to_string()]);
        assert!(feed.items.iter().all(|c| c.author.is_some()));
    }

    #[tokio::test]
    async fn test_get_hides_blocked_author_content() {
        let fixture = Fixture::new();
        let contents = service(&fixture);
        let users = UserServiceImpl::new(fixture.context(), fixture.identity.clone());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;

        let post = contents.create(&ada, ContentKind::Post, text("hello")).await.unwrap();
        assert!(contents.get(&bob, ContentKind::Post, &post.id).await.is_ok());

        users.toggle_block(&ada, &bob).await.unwrap();
        let err = contents.get(&bob, ContentKind::Post, &post.id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_and_delete_permissions() {
        let fixture = Fixture::new();
        let contents = service(&fixture);
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let post = contents.create(&ada, ContentKind::Post, text("draft")).await.unwrap();

        let edit = UpdateContentRequest {
            text: Some("final".to_string()),
            ..Default::default()
        };
        let err = contents
            .update(&bob, ContentKind::Post, &post.id, edit.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        let updated = contents.update(&ada, ContentKind::Post, &post.id, edit).await.unwrap();
        assert_eq!(updated.text.as_deref(), Some("final"));

        let err = contents
            .delete(&claims_for(&bob, UserRole::User), ContentKind::Post, &post.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        contents
            .delete(&claims_for(&bob, UserRole::Moderator), ContentKind::Post, &post.id)
            .await
            .unwrap();
        assert!(contents.get(&ada, ContentKind::Post, &post.id).await.is_err());
    }

    #[tokio::test]
    async fn test_saved_list_marks_reactions() {
        let fixture = Fixture::new();
        let contents = service(&fixture);
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let post = contents.create(&ada, ContentKind::Post, text("keep me")).await.unwrap();
        let feeling = contents
            .create(&ada, ContentKind::Feeling, CreateContentRequest {
                feeling: Some("calm".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        fixture.repos.contents.toggle_save(ContentKind::Post, &post.id, &bob).await.unwrap();
        fixture
            .repos
            .contents
            .toggle_save(ContentKind::Feeling, &feeling.id, &bob)
            .await
            .unwrap();

        let saved = contents.list_saved(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(saved.items.len(), 2);
        assert!(saved.items.iter().all(|c| c.saved_by_me && !c.liked_by_me));
    }
}
