//! Direct messaging service trait.

use crate::dto::{ConversationResponse, DirectMessageResponse, SendMessageRequest};
use agora_core::{AgoraResult, ConversationId, CursorPage, CursorRequest, MessageId, UserId};
use async_trait::async_trait;

/// One-to-one conversations.
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Opens (or reopens) the conversation with `peer`.
    async fn start_conversation(&self, viewer: &UserId, peer: &UserId) -> AgoraResult<ConversationResponse>;

    /// The viewer's visible conversations, most recently active first.
    async fn list_conversations(
        &self,
        viewer: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ConversationResponse>>;

    /// Messages newest first. Participants only.
    async fn list_messages(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<DirectMessageResponse>>;

    async fn send_message(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        request: SendMessageRequest,
    ) -> AgoraResult<DirectMessageResponse>;

    /// Resets the viewer's unread count.
    async fn mark_read(&self, viewer: &UserId, id: &ConversationId) -> AgoraResult<()>;

    /// Hides the conversation and its history for the viewer only.
    async fn delete_conversation(&self, viewer: &UserId, id: &ConversationId) -> AgoraResult<()>;

    /// Unsends one of the viewer's messages.
    async fn unsend_message(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        message_id: &MessageId,
    ) -> AgoraResult<DirectMessageResponse>;
}
