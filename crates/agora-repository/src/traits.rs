//! Repository trait definitions.

use agora_core::{
    AccountStatus, AgoraResult, Comment, CommentId, Content, ContentId, ContentKind, Conversation,
    ConversationId, ConversationSummary, CursorPage, CursorRequest, Edge, Message, MessageId,
    Report, ReportId, ReportStatus, SavedItem, UserId, UserProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of a toggle: the new state and the parent's counter after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
}

/// Whether a viewer liked and saved a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionFlags {
    pub liked: bool,
    pub saved: bool,
}

/// Profile fields to change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub display_name: Option<String>,
    /// `Some(None)` clears the bio.
    pub bio: Option<Option<String>>,
    /// `Some(None)` clears the avatar.
    pub avatar_url: Option<Option<String>>,
}

impl ProfileChanges {
    /// Returns true if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.display_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
    }
}

/// Content fields to change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChanges {
    /// `Some(None)` clears the text.
    pub text: Option<Option<String>>,
    pub media_urls: Option<Vec<String>>,
    pub feeling: Option<String>,
}

/// User profiles, the social graph, blocks and saved lists.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a profile by uid.
    async fn find_by_id(&self, id: &UserId) -> AgoraResult<Option<UserProfile>>;

    /// Finds existing profiles, in the order given, skipping missing ones.
    async fn find_many(&self, ids: &[UserId]) -> AgoraResult<Vec<UserProfile>>;

    /// Finds a profile by username, case-insensitively.
    async fn find_by_username(&self, username: &str) -> AgoraResult<Option<UserProfile>>;

    /// Profiles whose lowercased username starts with `prefix`.
    async fn search_by_username_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> AgoraResult<Vec<UserProfile>>;

    /// Reserves the username and writes the profile in one transaction.
    ///
    /// Fails with `Conflict` when the username or the profile already exists.
    async fn create(&self, profile: &UserProfile) -> AgoraResult<()>;

    /// Applies profile changes, moving the username reservation if needed.
    async fn update_profile(&self, id: &UserId, changes: ProfileChanges) -> AgoraResult<UserProfile>;

    /// Moves the account through its lifecycle.
    async fn set_status(
        &self,
        id: &UserId,
        status: AccountStatus,
        deletion_scheduled_for: Option<DateTime<Utc>>,
    ) -> AgoraResult<UserProfile>;

    /// Follows or unfollows `target`; the count is the target's follower count.
    async fn toggle_follow(&self, follower: &UserId, target: &UserId) -> AgoraResult<ToggleOutcome>;

    /// Whether `follower` follows `target`.
    async fn is_following(&self, follower: &UserId, target: &UserId) -> AgoraResult<bool>;

    /// Followers of `id`, newest first.
    async fn list_followers(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>>;

    /// Users `id` follows, newest first.
    async fn list_following(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>>;

    /// Up to `limit` uids `id` follows, most recent first.
    async fn following_ids(&self, id: &UserId, limit: usize) -> AgoraResult<Vec<UserId>>;

    /// Blocks or unblocks `target`. Blocking removes follows in both directions.
    ///
    /// Returns true when `target` is blocked afterwards.
    async fn toggle_block(&self, blocker: &UserId, target: &UserId) -> AgoraResult<bool>;

    /// Saved content of `id`, most recently saved first.
    async fn list_saved(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<SavedItem>>;
}

/// Posts, stories and feelings with their likes and saves.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Stores new content; posts also bump the author's post count.
    async fn create(&self, content: &Content) -> AgoraResult<()>;

    /// Finds content by id.
    async fn find_by_id(&self, kind: ContentKind, id: &ContentId) -> AgoraResult<Option<Content>>;

    /// Finds existing content, in the order given, skipping missing items.
    async fn find_many(&self, kind: ContentKind, ids: &[ContentId]) -> AgoraResult<Vec<Content>>;

    /// Applies changes to existing content.
    async fn update(&self, kind: ContentKind, id: &ContentId, changes: ContentChanges) -> AgoraResult<Content>;

    /// Deletes content with its likes, saves, comments and savers' entries.
    async fn delete(&self, kind: ContentKind, id: &ContentId) -> AgoraResult<()>;

    /// Content of one author, newest first. `active_at` drops expired items.
    async fn list_by_author(
        &self,
        kind: ContentKind,
        author: &UserId,
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Content>>;

    /// Content of several authors, newest first. `active_at` drops expired items.
    async fn list_by_authors(
        &self,
        kind: ContentKind,
        authors: &[UserId],
        page: &CursorRequest,
        active_at: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Content>>;

    /// Likes or unlikes; the count is the new like count.
    async fn toggle_like(&self, kind: ContentKind, id: &ContentId, user: &UserId) -> AgoraResult<ToggleOutcome>;

    /// Saves or unsaves; the count is the new save count.
    async fn toggle_save(&self, kind: ContentKind, id: &ContentId, user: &UserId) -> AgoraResult<ToggleOutcome>;

    /// Like and save flags of `user` for each id, in order.
    async fn reactions_of(
        &self,
        kind: ContentKind,
        ids: &[ContentId],
        user: &UserId,
    ) -> AgoraResult<Vec<ReactionFlags>>;

    /// Users who liked the content, newest first.
    async fn list_likers(&self, kind: ContentKind, id: &ContentId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>>;
}

/// Comments and comment likes.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Adds a comment and bumps the content's comment count.
    ///
    /// Fails with `NotFound` when the content does not exist.
    async fn add(&self, comment: &Comment) -> AgoraResult<()>;

    /// Finds a comment.
    async fn find(&self, kind: ContentKind, content_id: &ContentId, id: &CommentId) -> AgoraResult<Option<Comment>>;

    /// Deletes a comment with its likes and decrements the comment count.
    async fn delete(&self, kind: ContentKind, content_id: &ContentId, id: &CommentId) -> AgoraResult<()>;

    /// Comments of a content item, oldest first.
    async fn list(&self, kind: ContentKind, content_id: &ContentId, page: &CursorRequest) -> AgoraResult<CursorPage<Comment>>;

    /// Likes or unlikes a comment; the count is the new like count.
    async fn toggle_like(
        &self,
        kind: ContentKind,
        content_id: &ContentId,
        id: &CommentId,
        user: &UserId,
    ) -> AgoraResult<ToggleOutcome>;

    /// Whether `user` liked each comment, in order.
    async fn liked_by(
        &self,
        kind: ContentKind,
        content_id: &ContentId,
        ids: &[CommentId],
        user: &UserId,
    ) -> AgoraResult<Vec<bool>>;
}

/// Conversations, messages and per-user conversation lists.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Returns the conversation between `starter` and `peer`, creating it
    /// and both summaries when absent. Un-hides the starter's summary.
    async fn get_or_create(&self, starter: &UserId, peer: &UserId) -> AgoraResult<Conversation>;

    /// Finds a conversation.
    async fn find(&self, id: &ConversationId) -> AgoraResult<Option<Conversation>>;

    /// Writes the message and fans it out to both participants' summaries.
    async fn append_message(&self, message: &Message) -> AgoraResult<Conversation>;

    /// Messages newest first, only those sent after `after` when given.
    async fn list_messages(
        &self,
        id: &ConversationId,
        page: &CursorRequest,
        after: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Message>>;

    /// Finds a message.
    async fn find_message(&self, id: &ConversationId, message_id: &MessageId) -> AgoraResult<Option<Message>>;

    /// Visible summaries of `user`, most recently active first.
    async fn list_summaries(&self, user: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ConversationSummary>>;

    /// Finds one summary of `user`.
    async fn find_summary(&self, user: &UserId, id: &ConversationId) -> AgoraResult<Option<ConversationSummary>>;

    /// Resets `user`'s unread count.
    async fn mark_read(&self, user: &UserId, id: &ConversationId) -> AgoraResult<()>;

    /// Hides the conversation for `user` and clears its history for them.
    async fn hide(&self, user: &UserId, id: &ConversationId) -> AgoraResult<()>;

    /// Marks a message unsent and clears its content.
    async fn unsend_message(&self, id: &ConversationId, message_id: &MessageId) -> AgoraResult<Message>;
}

/// Moderation reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Files a report and bumps the target's report count.
    ///
    /// Fails with `Conflict` when the reporter already reported the target.
    async fn create(&self, report: &Report) -> AgoraResult<()>;

    /// Finds a report.
    async fn find(&self, id: &ReportId) -> AgoraResult<Option<Report>>;

    /// Reports newest first, optionally with one status.
    async fn list(&self, status: Option<ReportStatus>, page: &CursorRequest) -> AgoraResult<CursorPage<Report>>;

    /// Records a moderator decision.
    async fn update_status(&self, id: &ReportId, status: ReportStatus, reviewer: &UserId) -> AgoraResult<Report>;
}
