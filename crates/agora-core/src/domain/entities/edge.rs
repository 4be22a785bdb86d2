//! Marker documents for relationships.

use crate::domain::ContentKind;
use crate::{ContentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker for a follow, like or save. The document id is the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub user_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Creates a marker stamped now.
    #[must_use]
    pub fn now(user_id: UserId) -> Self {
        Self {
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Entry of `users/{uid}/saved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedItem {
    pub kind: ContentKind,
    pub content_id: ContentId,
    pub author_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    /// Document id under the saver's `saved` subcollection.
    #[must_use]
    pub fn doc_id(kind: ContentKind, content_id: &ContentId) -> String {
        format!("{}_{}", kind.as_str(), content_id)
    }
}

/// Document at `usernames/{username_lower}` claiming a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameReservation {
    pub uid: UserId,
}
