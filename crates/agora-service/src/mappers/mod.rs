//! Entity-DTO mappers.

use crate::dto::{
    AccountStatusResponse, CommentResponse, ContentResponse, ConversationResponse,
    DirectMessageResponse, ProfileResponse, ReportResponse, UserSummary,
};
use agora_core::{Comment, Content, ConversationSummary, Message, Report, UserId, UserProfile};
use agora_repository::ReactionFlags;

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            username: profile.username.clone(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

impl From<UserProfile> for UserSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
        }
    }
}

impl ProfileResponse {
    /// The caller's own profile, including their email.
    #[must_use]
    pub fn own(profile: UserProfile) -> Self {
        let email = Some(profile.email.clone());
        Self {
            email,
            ..Self::base(profile)
        }
    }

    /// Someone else's profile with the relationship flags.
    #[must_use]
    pub fn public(profile: UserProfile, is_following: bool, follows_you: bool) -> Self {
        Self {
            is_following: Some(is_following),
            follows_you: Some(follows_you),
            ..Self::base(profile)
        }
    }

    fn base(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            display_name: profile.display_name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            status: profile.status,
            follower_count: profile.follower_count,
            following_count: profile.following_count,
            post_count: profile.post_count,
            created_at: profile.created_at,
            email: None,
            is_following: None,
            follows_you: None,
        }
    }
}

impl From<&UserProfile> for AccountStatusResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            status: profile.status,
            deactivated_at: profile.deactivated_at,
            deletion_scheduled_for: profile.deletion_scheduled_for,
        }
    }
}

impl ContentResponse {
    /// Builds the response for one viewer.
    #[must_use]
    pub fn from_content(content: Content, author: Option<UserSummary>, flags: ReactionFlags) -> Self {
        Self {
            id: content.id,
            kind: content.kind,
            author_id: content.author_id,
            author,
            text: content.text,
            media_urls: content.media_urls,
            feeling: content.feeling,
            like_count: content.like_count,
            save_count: content.save_count,
            comment_count: content.comment_count,
            created_at: content.created_at,
            updated_at: content.updated_at,
            expires_at: content.expires_at,
            liked_by_me: flags.liked,
            saved_by_me: flags.saved,
        }
    }
}

impl CommentResponse {
    /// Builds the response for one viewer.
    #[must_use]
    pub fn from_comment(comment: Comment, author: Option<UserSummary>, liked_by_me: bool) -> Self {
        Self {
            id: comment.id,
            kind: comment.kind,
            content_id: comment.content_id,
            author_id: comment.author_id,
            author,
            text: comment.text,
            like_count: comment.like_count,
            created_at: comment.created_at,
            liked_by_me,
        }
    }
}

impl ConversationResponse {
    /// Builds a list entry from the caller's summary.
    #[must_use]
    pub fn from_summary(summary: ConversationSummary, peer: Option<UserSummary>) -> Self {
        Self {
            id: summary.conversation_id,
            peer_id: summary.peer_id,
            peer,
            last_message: summary.last_message,
            unread_count: summary.unread_count,
            updated_at: summary.updated_at,
        }
    }
}

impl DirectMessageResponse {
    /// Builds the response as seen by `viewer`.
    #[must_use]
    pub fn for_viewer(message: Message, viewer: &UserId) -> Self {
        let is_mine = &message.sender_id == viewer;
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            text: message.text,
            media_url: message.media_url,
            unsent: message.unsent,
            created_at: message.created_at,
            is_mine,
        }
    }
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            target_kind: report.target_kind,
            target_id: report.target_id,
            parent_kind: report.parent_kind,
            parent_id: report.parent_id,
            reason: report.reason,
            details: report.details,
            status: report.status,
            reviewed_by: report.reviewed_by,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}
