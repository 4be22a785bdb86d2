//! Like, save and comment DTOs.

use super::UserSummary;
use agora_core::validation::rules::not_blank;
use agora_core::{CommentId, ContentId, ContentKind, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Result of a like toggle on content or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Result of a save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub save_count: i64,
}

/// Request to comment on content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(custom(function = "not_blank", message = "Comment text is required"))]
    pub text: String,
}

/// Comment as seen by a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub kind: ContentKind,
    pub content_id: ContentId,
    pub author_id: UserId,
    pub author: Option<UserSummary>,
    pub text: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub liked_by_me: bool,
}
