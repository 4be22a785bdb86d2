//! Comment entity.

use crate::domain::ContentKind;
use crate::{CommentId, ContentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment stored under `{kind}/{content_id}/comments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub kind: ContentKind,
    pub content_id: ContentId,
    pub author_id: UserId,
    pub text: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub report_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment with zeroed counters.
    #[must_use]
    pub fn new(kind: ContentKind, content_id: ContentId, author_id: UserId, text: String) -> Self {
        Self {
            id: CommentId::generate(),
            kind,
            content_id,
            author_id,
            text,
            like_count: 0,
            report_count: 0,
            created_at: Utc::now(),
        }
    }
}
