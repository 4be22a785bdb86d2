//! Post, story and feeling entity.

use crate::domain::ContentKind;
use crate::{ContentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post, story or feeling with its denormalized counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub kind: ContentKind,
    pub author_id: UserId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Feeling label, only set on feelings.
    #[serde(default)]
    pub feeling: Option<String>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub report_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Stories disappear after this instant.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Content {
    /// Creates content with zeroed counters.
    #[must_use]
    pub fn new(kind: ContentKind, author_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ContentId::generate(),
            kind,
            author_id,
            text: None,
            media_urls: Vec::new(),
            feeling: None,
            like_count: 0,
            save_count: 0,
            comment_count: 0,
            report_count: 0,
            created_at: now,
            updated_at: now,
            expires_at: None,
        }
    }

    /// Whether the content expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether `user` wrote this content.
    #[must_use]
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.author_id == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry() {
        let mut story = Content::new(ContentKind::Story, UserId::new("u1"));
        let now = Utc::now();
        assert!(!story.is_expired_at(now));
        story.expires_at = Some(now - Duration::seconds(1));
        assert!(story.is_expired_at(now));
    }
}
