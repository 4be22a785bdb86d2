//! Posts, stories and feelings.
//!
//! One router per [`ContentKind`]; the kind reaches handlers as an
//! [`Extension`] so the same handlers serve `/posts`, `/stories` and
//! `/feelings`.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use agora_core::{ContentId, ContentKind, CursorPage, CursorRequest, UserId};
use agora_service::{ContentResponse, CreateContentRequest, UpdateContentRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::debug;

/// Creates the router for one content kind.
pub fn router(kind: ContentKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/user/:uid", get(list_by_author))
        .route("/:id", get(get_content).patch(update).delete(delete_content))
        .merge(super::interaction_controller::router())
        .layer(Extension(kind))
}

/// `/feeds`: the home feed.
pub fn feed_router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}

async fn feed(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ContentResponse>> {
    let response = state.services.contents.feed(&user.uid(), &page).await?;
    ok(response)
}

/// Posts list the feed, stories the active stories, feelings those of
/// followed authors.
async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ContentResponse>> {
    let viewer = user.uid();
    let contents = &state.services.contents;
    let response = match kind {
        ContentKind::Post => contents.feed(&viewer, &page).await?,
        ContentKind::Story => contents.stories(&viewer, &page).await?,
        ContentKind::Feeling => contents.feelings(&viewer, &page).await?,
    };
    ok(response)
}

async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateContentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContentResponse>>), AppError> {
    debug!("Create {} request from {}", kind, user.sub);

    let response = state.services.contents.create(&user.uid(), kind, request).await?;
    Ok(created(response))
}

async fn list_by_author(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ContentResponse>> {
    let response = state
        .services
        .contents
        .list_by_author(&user.uid(), kind, &UserId::new(uid), &page)
        .await?;
    ok(response)
}

async fn get_content(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<ContentResponse> {
    let response = state
        .services
        .contents
        .get(&user.uid(), kind, &ContentId::new(id))
        .await?;
    ok(response)
}

async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateContentRequest>,
) -> ApiResult<ContentResponse> {
    let response = state
        .services
        .contents
        .update(&user.uid(), kind, &ContentId::new(id), request)
        .await?;
    ok(response)
}

async fn delete_content(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .contents
        .delete(&user.0, kind, &ContentId::new(id))
        .await?;
    Ok(no_content())
}
