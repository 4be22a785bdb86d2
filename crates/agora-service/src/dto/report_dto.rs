//! Moderation report DTOs.

use agora_core::{ContentKind, ReportId, ReportReason, ReportStatus, ReportTargetKind, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to report a user, content, comment or message.
///
/// Comments need `parent_kind` and `parent_id` (the content id). Messages
/// need `parent_id` (the conversation id).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitReportRequest {
    pub target_kind: ReportTargetKind,

    #[validate(length(min = 1, message = "Target id is required"))]
    pub target_id: String,

    pub parent_kind: Option<ContentKind>,

    pub parent_id: Option<String>,

    pub reason: ReportReason,

    #[validate(length(max = 1000, message = "Details cannot exceed 1000 characters"))]
    pub details: Option<String>,
}

/// Moderator decision on a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveReportRequest {
    pub status: ReportStatus,
}

/// Report response DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: ReportId,
    pub reporter_id: UserId,
    pub target_kind: ReportTargetKind,
    pub target_id: String,
    pub parent_kind: Option<ContentKind>,
    pub parent_id: Option<String>,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
