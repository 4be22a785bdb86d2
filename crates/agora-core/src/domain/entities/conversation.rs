//! Direct messaging entities.

use crate::{ConversationId, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest preview kept on conversation documents.
const PREVIEW_CHARS: usize = 100;

/// Conversation between exactly two users, at `conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<UserId>,
    #[serde(default)]
    pub last_message: Option<MessagePreview>,
    #[serde(default)]
    pub message_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates the conversation between `a` and `b`.
    #[must_use]
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let now = Utc::now();
        let mut participants = vec![a.clone(), b.clone()];
        participants.sort();
        Self {
            id: ConversationId::between(a, b),
            participants,
            last_message: None,
            message_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user` takes part in this conversation.
    #[must_use]
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    /// The other participant, from `user`'s point of view.
    #[must_use]
    pub fn peer_of(&self, user: &UserId) -> Option<&UserId> {
        self.participants.iter().find(|p| *p != user)
    }
}

/// Short form of the latest message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub sent_at: DateTime<Utc>,
}

impl MessagePreview {
    /// Builds the preview of `message`, truncating long text.
    #[must_use]
    pub fn of(message: &Message) -> Self {
        let text = match (&message.text, &message.media_url) {
            (Some(text), _) => text.chars().take(PREVIEW_CHARS).collect(),
            (None, Some(_)) => "[media]".to_string(),
            (None, None) => String::new(),
        };
        Self {
            message_id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            text,
            sent_at: message.created_at,
        }
    }
}

/// Per-user entry at `users/{uid}/conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub peer_id: UserId,
    #[serde(default)]
    pub last_message: Option<MessagePreview>,
    #[serde(default)]
    pub unread_count: i64,
    /// Set when the owner deleted the conversation on their side.
    #[serde(default)]
    pub hidden: bool,
    /// Messages sent before this instant are hidden from the owner.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub cleared_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ConversationSummary {
    /// Fresh summary for `peer_id`.
    #[must_use]
    pub fn new(conversation_id: ConversationId, peer_id: UserId) -> Self {
        Self {
            conversation_id,
            peer_id,
            last_message: None,
            unread_count: 0,
            hidden: false,
            cleared_at: None,
            updated_at: Utc::now(),
        }
    }
}

/// Message at `conversations/{cid}/messages/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    /// Set when the sender unsent the message; text and media are cleared.
    #[serde(default)]
    pub unsent: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped now.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: Option<String>,
        media_url: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender_id,
            text,
            media_url,
            unsent: false,
            created_at: Utc::now(),
        }
    }
}
