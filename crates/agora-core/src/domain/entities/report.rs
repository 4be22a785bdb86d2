//! Moderation report entity.

use crate::domain::{ContentKind, ReportReason, ReportStatus, ReportTargetKind};
use crate::{ReportId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report at `reports/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub reporter_id: UserId,
    pub target_kind: ReportTargetKind,
    pub target_id: String,
    /// Kind of the content a reported comment belongs to.
    #[serde(default)]
    pub parent_kind: Option<ContentKind>,
    /// Content id for comments, conversation id for messages.
    #[serde(default)]
    pub parent_id: Option<String>,
    pub reason: ReportReason,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub reviewed_by: Option<UserId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Deterministic id: one report per reporter and target.
    #[must_use]
    pub fn id_for(reporter: &UserId, target_kind: ReportTargetKind, target_id: &str) -> ReportId {
        ReportId(format!("{}_{}_{}", reporter, target_kind.as_str(), target_id))
    }
}
