//! Moderation report controller.

use crate::{
    extractors::{AuthenticatedUser, ReportFilter, ValidatedJson},
    responses::{created, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use agora_core::{CursorPage, CursorRequest, ReportId};
use agora_service::{ReportResponse, ResolveReportRequest, SubmitReportRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::debug;

/// Creates the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(submit_report))
        .route("/:id", patch(resolve_report))
}

async fn submit_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<SubmitReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponse>>), AppError> {
    debug!(
        "Report from {} against {} {}",
        user.sub,
        request.target_kind.as_str(),
        request.target_id
    );

    let response = state.services.reports.submit(&user.uid(), request).await?;
    Ok(created(response))
}

/// Moderation queue, newest first. Moderators only.
async fn list_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ReportFilter>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ReportResponse>> {
    let response = state.services.reports.list(&user.0, filter.status, &page).await?;
    ok(response)
}

async fn resolve_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<ResolveReportRequest>,
) -> ApiResult<ReportResponse> {
    let response = state
        .services
        .reports
        .resolve(&user.0, &ReportId::new(id), request.status)
        .await?;
    ok(response)
}
