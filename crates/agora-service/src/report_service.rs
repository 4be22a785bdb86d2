//! Moderation report service trait.

use crate::dto::{ReportResponse, SubmitReportRequest};
use agora_core::{AgoraResult, CursorPage, CursorRequest, ReportId, ReportStatus, UserId};
use agora_security::Claims;
use async_trait::async_trait;

#[async_trait]
pub trait ReportService: Send + Sync {
    /// Files a report. Each reporter may report a target once.
    async fn submit(&self, reporter: &UserId, request: SubmitReportRequest) -> AgoraResult<ReportResponse>;

    /// Lists reports. Moderators only.
    async fn list(
        &self,
        caller: &Claims,
        status: Option<ReportStatus>,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ReportResponse>>;

    /// Records a decision on a report. Moderators only.
    async fn resolve(&self, caller: &Claims, id: &ReportId, status: ReportStatus) -> AgoraResult<ReportResponse>;
}
