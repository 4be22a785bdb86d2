//! Post, story and feeling DTOs.

use super::UserSummary;
use agora_core::{ContentId, ContentKind, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to publish a post, story or feeling.
///
/// Text length and media count limits come from configuration and are
/// checked by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateContentRequest {
    pub text: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Too many media URLs"))]
    pub media_urls: Vec<String>,

    #[validate(length(min = 1, max = 40, message = "Feeling must be 1-40 characters"))]
    pub feeling: Option<String>,
}

/// Request to edit content. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateContentRequest {
    pub text: Option<String>,

    #[validate(length(max = 50, message = "Too many media URLs"))]
    pub media_urls: Option<Vec<String>>,

    #[validate(length(min = 1, max = 40, message = "Feeling must be 1-40 characters"))]
    pub feeling: Option<String>,
}

/// Content as seen by a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub id: ContentId,
    pub kind: ContentKind,
    pub author_id: UserId,
    pub author: Option<UserSummary>,
    pub text: Option<String>,
    pub media_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feeling: Option<String>,
    pub like_count: i64,
    pub save_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub liked_by_me: bool,
    pub saved_by_me: bool,
}
