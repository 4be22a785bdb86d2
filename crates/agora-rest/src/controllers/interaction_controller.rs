//! Likes, saves and comments on content. Mounted under each content kind.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use agora_core::{CommentId, ContentId, ContentKind, CursorPage, CursorRequest};
use agora_service::{AddCommentRequest, CommentResponse, LikeResponse, SaveResponse, UserSummary};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/like", post(toggle_like))
        .route("/:id/save", post(toggle_save))
        .route("/:id/likes", get(list_likers))
        .route("/:id/comments", get(list_comments).post(add_comment))
        .route("/:id/comments/:cid", delete(delete_comment))
        .route("/:id/comments/:cid/like", post(toggle_comment_like))
}

async fn toggle_like(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<LikeResponse> {
    let response = state
        .services
        .interactions
        .toggle_like(&user.uid(), kind, &ContentId::new(id))
        .await?;
    ok(response)
}

async fn toggle_save(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<SaveResponse> {
    let response = state
        .services
        .interactions
        .toggle_save(&user.uid(), kind, &ContentId::new(id))
        .await?;
    ok(response)
}

async fn list_likers(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<UserSummary>> {
    let response = state
        .services
        .interactions
        .list_likers(&user.uid(), kind, &ContentId::new(id), &page)
        .await?;
    ok(response)
}

async fn list_comments(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<CommentResponse>> {
    let response = state
        .services
        .interactions
        .list_comments(&user.uid(), kind, &ContentId::new(id), &page)
        .await?;
    ok(response)
}

async fn add_comment(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), AppError> {
    let response = state
        .services
        .interactions
        .add_comment(&user.uid(), kind, &ContentId::new(id), request)
        .await?;
    Ok(created(response))
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path((id, cid)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .interactions
        .delete_comment(&user.0, kind, &ContentId::new(id), &CommentId::new(cid))
        .await?;
    Ok(no_content())
}

async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    user: AuthenticatedUser,
    Path((id, cid)): Path<(String, String)>,
) -> ApiResult<LikeResponse> {
    let response = state
        .services
        .interactions
        .toggle_comment_like(&user.uid(), kind, &ContentId::new(id), &CommentId::new(cid))
        .await?;
    ok(response)
}
