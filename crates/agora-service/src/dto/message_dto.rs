//! Direct messaging DTOs.

use super::UserSummary;
use agora_core::{ConversationId, MessageId, MessagePreview, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to open a conversation with another user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartConversationRequest {
    #[validate(length(min = 1, message = "Peer id is required"))]
    pub peer_id: String,
}

/// Request to send a direct message. Text or media is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub text: Option<String>,

    #[validate(url(message = "Invalid media URL"))]
    pub media_url: Option<String>,
}

/// One entry of the caller's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub id: ConversationId,
    pub peer_id: UserId,
    pub peer: Option<UserSummary>,
    pub last_message: Option<MessagePreview>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// A direct message as seen by a participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessageResponse {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub unsent: bool,
    pub created_at: DateTime<Utc>,
    pub is_mine: bool,
}
