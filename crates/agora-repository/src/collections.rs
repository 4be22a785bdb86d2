//! Collection names and document paths.

use crate::dao::DocumentPath;
use agora_core::{CommentId, ContentId, ContentKind, ConversationId, MessageId, ReportId, UserId};

pub const USERS: &str = "users";
pub const USERNAMES: &str = "usernames";
pub const CONVERSATIONS: &str = "conversations";
pub const REPORTS: &str = "reports";

pub const FOLLOWERS: &str = "followers";
pub const FOLLOWING: &str = "following";
pub const SAVED: &str = "saved";
pub const USER_CONVERSATIONS: &str = "conversations";
pub const LIKES: &str = "likes";
pub const SAVES: &str = "saves";
pub const COMMENTS: &str = "comments";
pub const MESSAGES: &str = "messages";

/// `users/{uid}`
#[must_use]
pub fn user(id: &UserId) -> DocumentPath {
    DocumentPath::new(USERS, id.as_str())
}

/// `usernames/{username_lower}`
#[must_use]
pub fn username(username_lower: &str) -> DocumentPath {
    DocumentPath::new(USERNAMES, username_lower)
}

/// `users/{target}/followers/{follower}`
#[must_use]
pub fn follower_edge(target: &UserId, follower: &UserId) -> DocumentPath {
    user(target).child(FOLLOWERS, follower.as_str())
}

/// `users/{follower}/following/{target}`
#[must_use]
pub fn following_edge(follower: &UserId, target: &UserId) -> DocumentPath {
    user(follower).child(FOLLOWING, target.as_str())
}

/// `{kind}/{id}`
#[must_use]
pub fn content(kind: ContentKind, id: &ContentId) -> DocumentPath {
    DocumentPath::new(kind.collection(), id.as_str())
}

/// `{kind}/{id}/likes/{uid}`
#[must_use]
pub fn content_like(kind: ContentKind, id: &ContentId, user: &UserId) -> DocumentPath {
    content(kind, id).child(LIKES, user.as_str())
}

/// `{kind}/{id}/saves/{uid}`
#[must_use]
pub fn content_save(kind: ContentKind, id: &ContentId, user: &UserId) -> DocumentPath {
    content(kind, id).child(SAVES, user.as_str())
}

/// `users/{uid}/saved/{kind}_{id}`
#[must_use]
pub fn saved_item(user_id: &UserId, kind: ContentKind, id: &ContentId) -> DocumentPath {
    user(user_id).child(SAVED, agora_core::SavedItem::doc_id(kind, id))
}

/// `{kind}/{content_id}/comments/{id}`
#[must_use]
pub fn comment(kind: ContentKind, content_id: &ContentId, id: &CommentId) -> DocumentPath {
    content(kind, content_id).child(COMMENTS, id.as_str())
}

/// `{kind}/{content_id}/comments/{id}/likes/{uid}`
#[must_use]
pub fn comment_like(kind: ContentKind, content_id: &ContentId, id: &CommentId, user: &UserId) -> DocumentPath {
    comment(kind, content_id, id).child(LIKES, user.as_str())
}

/// `conversations/{id}`
#[must_use]
pub fn conversation(id: &ConversationId) -> DocumentPath {
    DocumentPath::new(CONVERSATIONS, id.as_str())
}

/// `conversations/{id}/messages/{message_id}`
#[must_use]
pub fn message(id: &ConversationId, message_id: &MessageId) -> DocumentPath {
    conversation(id).child(MESSAGES, message_id.as_str())
}

/// `users/{uid}/conversations/{id}`
#[must_use]
pub fn user_conversation(user_id: &UserId, id: &ConversationId) -> DocumentPath {
    user(user_id).child(USER_CONVERSATIONS, id.as_str())
}

/// `reports/{id}`
#[must_use]
pub fn report(id: &ReportId) -> DocumentPath {
    DocumentPath::new(REPORTS, id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let uid = UserId::new("u1");
        let post = ContentId::new("p1");
        assert_eq!(content_like(ContentKind::Post, &post, &uid).to_string(), "posts/p1/likes/u1");
        assert_eq!(saved_item(&uid, ContentKind::Story, &post).to_string(), "users/u1/saved/story_p1");
        assert_eq!(
            comment_like(ContentKind::Feeling, &post, &CommentId::new("c1"), &uid).to_string(),
            "feelings/p1/comments/c1/likes/u1"
        );
        assert_eq!(
            user_conversation(&uid, &ConversationId::new("u1_u2")).to_string(),
            "users/u1/conversations/u1_u2"
        );
    }
}
