//! Direct message controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use agora_core::{ConversationId, CursorPage, CursorRequest, MessageId, UserId};
use agora_service::{
    ConversationResponse, DirectMessageResponse, SendMessageRequest, StartConversationRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

/// Creates the messages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list_conversations).post(start_conversation))
        .route("/conversations/:cid", delete(delete_conversation))
        .route("/conversations/:cid/messages", get(list_messages).post(send_message))
        .route("/conversations/:cid/messages/:mid", delete(unsend_message))
        .route("/conversations/:cid/read", post(mark_read))
}

async fn list_conversations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<ConversationResponse>> {
    let response = state.services.messages.list_conversations(&user.uid(), &page).await?;
    ok(response)
}

async fn start_conversation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<StartConversationRequest>,
) -> ApiResult<ConversationResponse> {
    let response = state
        .services
        .messages
        .start_conversation(&user.uid(), &UserId::new(request.peer_id))
        .await?;
    ok(response)
}

/// Hides the conversation and its history for the caller only.
async fn delete_conversation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cid): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .messages
        .delete_conversation(&user.uid(), &ConversationId::new(cid))
        .await?;
    Ok(no_content())
}

async fn list_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cid): Path<String>,
    Query(page): Query<CursorRequest>,
) -> ApiResult<CursorPage<DirectMessageResponse>> {
    let response = state
        .services
        .messages
        .list_messages(&user.uid(), &ConversationId::new(cid), &page)
        .await?;
    ok(response)
}

async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cid): Path<String>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DirectMessageResponse>>), AppError> {
    let response = state
        .services
        .messages
        .send_message(&user.uid(), &ConversationId::new(cid), request)
        .await?;
    Ok(created(response))
}

async fn unsend_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((cid, mid)): Path<(String, String)>,
) -> ApiResult<DirectMessageResponse> {
    let response = state
        .services
        .messages
        .unsend_message(&user.uid(), &ConversationId::new(cid), &MessageId::new(mid))
        .await?;
    ok(response)
}

async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(cid): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .messages
        .mark_read(&user.uid(), &ConversationId::new(cid))
        .await?;
    Ok(no_content())
}
