//! Profile, social graph and account lifecycle controller.

use crate::{
    extractors::{AuthenticatedUser, SearchQuery, ValidatedJson},
    responses::{ok, ApiResult},
    state::AppState,
};
use agora_core::{CursorPage, CursorRequest, UserId};
use agora_security::AuthTokens;
use agora_service::{
    AccountStatusResponse, BlockResponse, ChangePasswordRequest, ContentResponse,
    DeleteAccountRequest, FollowResponse, ProfileResponse, UpdateProfileRequest, UserSummary,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Router,
};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/me", get(own_profile).patch(update_profile))
        .route("/me/password", put(change_password))
        .route("/me/deactivate", post(deactivate))
        .route("/me/delete", post(request_deletion))
        .route("/me/restore", post(cancel_deletion))
        .route("/me/blocked", get(list_blocked))
        .route("/me/saved", get(list_saved))
        .route("/:uid", get(get_profile))
        .route("/:uid/follow", post(toggle_follow))
        .route("/:uid/block", post(toggle_block))
        .route("/:uid/followers", get(list_followers))
        .route("/:uid/following", get(list_following))
}

async fn search(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<UserSummary>> {
    debug!("User search: {}", query.q);

    let response = state
        .services
        .users
        .search(&user.uid(), &query.q, query.limit())
        .await?;
    ok(response)
}

async fn own_profile(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<ProfileResponse> {
    let uid = user.uid();
    let response = state.services.users.get_profile(&uid, &uid).await?;
    ok(response)
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ProfileResponse> {
    let response = state.services.users.update_profile(&user.uid(), request).await?;
    ok(response)
}

/// Changes the password and returns fresh tokens; older ones are revoked.
async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<AuthTokens> {
    let response = state.services.users.change_password(&user.uid(), request).await?;
    ok(response)
}

async fn deactivate(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<AccountStatusResponse> {
    let response = state.services.users.deactivate(&user.uid()).await?;
    ok(response)
}

async fn request_deletion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<DeleteAccountRequest>,
) -> ApiResult<AccountStatusResponse> {
    let response = state.services.users.request_deletion(&user.uid(), request).await?;
    ok(response)
}

async fn cancel_deletion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<AccountStatusResponse> {
    let response = state.services.users.cancel_deletion(&user.uid()).await?;
    ok(response)
}

async fn list_blocked(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Vec<UserSummary>> {
    let response = state.services.users.list_blocked(&user.uid()).await?;
    ok(response)
}

async fn list_saved(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ContentResponse>> {
    let response = state.services.contents.list_saved(&user.uid(), &page).await?;
    ok(response)
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
) -> ApiResult<ProfileResponse> {
    let response = state
        .services
        .users
        .get_profile(&user.uid(), &UserId::new(uid))
        .await?;
    ok(response)
}

async fn toggle_follow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
) -> ApiResult<FollowResponse> {
    let response = state
        .services
        .users
        .toggle_follow(&user.uid(), &UserId::new(uid))
        .await?;
    ok(response)
}

async fn toggle_block(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
) -> ApiResult<BlockResponse> {
    let response = state
        .services
        .users
        .toggle_block(&user.uid(), &UserId::new(uid))
        .await?;
    ok(response)
}

async fn list_followers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<UserSummary>> {
    let response = state
        .services
        .users
        .list_followers(&user.uid(), &UserId::new(uid), &page)
        .await?;
    ok(response)
}

async fn list_following(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(uid): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<UserSummary>> {
    let response = state
        .services
        .users
        .list_following(&user.uid(), &UserId::new(uid), &page)
        .await?;
    ok(response)
}
