//! Kinds of user content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of user content. Each lives in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Regular post, shown in feeds.
    Post,
    /// Short-lived story.
    Story,
    /// Mood update with a feeling label.
    Feeling,
}

impl ContentKind {
    /// All content kinds.
    pub const ALL: [Self; 3] = [Self::Post, Self::Story, Self::Feeling];

    /// Collection holding documents of this kind.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Story => "stories",
            Self::Feeling => "feelings",
        }
    }

    /// Singular name used in ids and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Story => "story",
            Self::Feeling => "feeling",
        }
    }

    /// Resource name for not-found errors.
    #[must_use]
    pub const fn resource_name(&self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Story => "Story",
            Self::Feeling => "Feeling",
        }
    }

    /// Parses either the singular or the collection name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" | "posts" => Some(Self::Post),
            "story" | "stories" => Some(Self::Story),
            "feeling" | "feelings" => Some(Self::Feeling),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
