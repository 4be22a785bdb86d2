//! Moderation report value objects.

use super::ContentKind;
use serde::{Deserialize, Serialize};

/// What a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTargetKind {
    User,
    Post,
    Story,
    Feeling,
    Comment,
    Message,
}

impl ReportTargetKind {
    /// Content kind for post, story and feeling targets.
    #[must_use]
    pub const fn content_kind(&self) -> Option<ContentKind> {
        match self {
            Self::Post => Some(ContentKind::Post),
            Self::Story => Some(ContentKind::Story),
            Self::Feeling => Some(ContentKind::Feeling),
            Self::User | Self::Comment | Self::Message => None,
        }
    }

    /// Lowercase name used in report ids.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Post => "post",
            Self::Story => "story",
            Self::Feeling => "feeling",
            Self::Comment => "comment",
            Self::Message => "message",
        }
    }
}

impl From<ContentKind> for ReportTargetKind {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Post => Self::Post,
            ContentKind::Story => Self::Story,
            ContentKind::Feeling => Self::Feeling,
        }
    }
}

/// Reason given by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    HateSpeech,
    Violence,
    Nudity,
    FalseInformation,
    Other,
}

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Awaiting review.
    #[default]
    Open,
    /// A moderator acted on it.
    Reviewed,
    /// A moderator found nothing to act on.
    Dismissed,
}

impl ReportStatus {
    /// Lowercase name, as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Reviewed => "reviewed",
            Self::Dismissed => "dismissed",
        }
    }
}
