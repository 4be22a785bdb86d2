//! `ConversationRepositoryImpl`: direct messages and their fan-out.
//!
//! A conversation between two users lives at `conversations/{a_b}` with its
//! messages underneath. Each participant also has a summary document under
//! `users/{uid}/conversations/{a_b}` carrying the preview, unread count and
//! visibility for that user. Every message write touches the message, the
//! conversation and both summaries in one transaction.

use super::support::{decode_page, millis};
use crate::collections;
use crate::dao::{fields, Direction, DocumentStore, Filter, Query, WriteOp};
use crate::traits::ConversationRepository;
use agora_core::{
    AgoraError, AgoraResult, Conversation, ConversationId, ConversationSummary, CursorPage,
    CursorRequest, Message, MessageId, MessagePreview, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Preview text shown after the latest message is unsent.
const UNSENT_PREVIEW: &str = "Message unsent";

/// Repository implementation over a [`DocumentStore`].
pub struct ConversationRepositoryImpl {
    store: Arc<dyn DocumentStore>,
}

impl ConversationRepositoryImpl {
    /// Creates a new `ConversationRepositoryImpl` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn update_summary(&self, user: &UserId, id: &ConversationId, changes: crate::dao::Fields) -> AgoraResult<()> {
        let path = collections::user_conversation(user, id);
        let mut tx = self.store.begin().await?;
        if tx.get(&path).await?.is_none() {
            return Err(AgoraError::not_found("Conversation", id));
        }
        tx.write(WriteOp::update(path, changes));
        tx.commit().await
    }
}

#[async_trait]
impl ConversationRepository for ConversationRepositoryImpl {
    async fn get_or_create(&self, starter: &UserId, peer: &UserId) -> AgoraResult<Conversation> {
        let fresh = Conversation::between(starter, peer);
        let path = collections::conversation(&fresh.id);
        let starter_path = collections::user_conversation(starter, &fresh.id);
        let peer_path = collections::user_conversation(peer, &fresh.id);

        let mut tx = self.store.begin().await?;
        let existing = tx.get(&path).await?;
        let starter_summary = tx.get(&starter_path).await?;
        let peer_summary = tx.get(&peer_path).await?;

        let conversation = match existing {
            Some(doc) => doc.decode()?,
            None => {
                debug!("Repository: creating conversation {}", fresh.id);
                tx.write(WriteOp::create(path, &fresh)?);
                fresh
            }
        };

        match starter_summary {
            Some(doc) => {
                if doc.fields.get("hidden").and_then(Value::as_bool).unwrap_or(false) {
                    tx.write(WriteOp::update(starter_path, fields([("hidden", Value::Bool(false))])));
                }
            }
            None => {
                let summary = ConversationSummary::new(conversation.id.clone(), peer.clone());
                tx.write(WriteOp::set(starter_path, &summary)?);
            }
        }
        if peer_summary.is_none() {
            // The peer only sees the conversation once a message arrives.
            let mut summary = ConversationSummary::new(conversation.id.clone(), starter.clone());
            summary.hidden = true;
            tx.write(WriteOp::set(peer_path, &summary)?);
        }

        tx.commit().await?;
        Ok(conversation)
    }

    async fn find(&self, id: &ConversationId) -> AgoraResult<Option<Conversation>> {
        self.store
            .get(&collections::conversation(id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn append_message(&self, message: &Message) -> AgoraResult<Conversation> {
        let id = &message.conversation_id;
        let path = collections::conversation(id);

        let mut tx = self.store.begin().await?;
        let mut conversation: Conversation = tx
            .get(&path)
            .await?
            .ok_or_else(|| AgoraError::not_found("Conversation", id))?
            .decode()?;
        let recipient = conversation
            .peer_of(&message.sender_id)
            .cloned()
            .ok_or_else(|| AgoraError::forbidden("Not a participant of this conversation"))?;
        let sender_path = collections::user_conversation(&message.sender_id, id);
        let recipient_path = collections::user_conversation(&recipient, id);
        let sender_summary = tx.get(&sender_path).await?;
        let recipient_summary = tx.get(&recipient_path).await?;

        let preview = MessagePreview::of(message);
        conversation.last_message = Some(preview.clone());
        conversation.message_count += 1;
        conversation.updated_at = message.created_at;

        let mut sender_summary = match sender_summary {
            Some(doc) => doc.decode()?,
            None => ConversationSummary::new(id.clone(), recipient.clone()),
        };
        sender_summary.last_message = Some(preview.clone());
        sender_summary.hidden = false;
        sender_summary.updated_at = message.created_at;

        let mut recipient_summary = match recipient_summary {
            Some(doc) => doc.decode()?,
            None => ConversationSummary::new(id.clone(), message.sender_id.clone()),
        };
        recipient_summary.last_message = Some(preview);
        recipient_summary.hidden = false;
        recipient_summary.unread_count += 1;
        recipient_summary.updated_at = message.created_at;

        tx.write(WriteOp::create(collections::message(id, &message.id), message)?);
        tx.write(WriteOp::set(path, &conversation)?);
        tx.write(WriteOp::set(sender_path, &sender_summary)?);
        tx.write(WriteOp::set(recipient_path, &recipient_summary)?);
        tx.commit().await?;

        debug!("Repository: message {} fanned out to {} and {}", message.id, message.sender_id, recipient);
        Ok(conversation)
    }

    async fn list_messages(
        &self,
        id: &ConversationId,
        page: &CursorRequest,
        after: Option<DateTime<Utc>>,
    ) -> AgoraResult<CursorPage<Message>> {
        let mut query = Query::collection(collections::conversation(id).subcollection(collections::MESSAGES));
        if let Some(after) = after {
            query = query.filter(Filter::gt("created_at", millis(after)));
        }
        let query = query
            .order_by("created_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }

    async fn find_message(&self, id: &ConversationId, message_id: &MessageId) -> AgoraResult<Option<Message>> {
        self.store
            .get(&collections::message(id, message_id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn list_summaries(&self, user: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<ConversationSummary>> {
        let query = Query::collection(collections::user(user).subcollection(collections::USER_CONVERSATIONS))
            .filter(Filter::eq("hidden", false))
            .order_by("updated_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }

    async fn find_summary(&self, user: &UserId, id: &ConversationId) -> AgoraResult<Option<ConversationSummary>> {
        self.store
            .get(&collections::user_conversation(user, id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn mark_read(&self, user: &UserId, id: &ConversationId) -> AgoraResult<()> {
        self.update_summary(user, id, fields([("unread_count", Value::from(0))]))
            .await
    }

    async fn hide(&self, user: &UserId, id: &ConversationId) -> AgoraResult<()> {
        debug!("Repository: hiding conversation {} for {}", id, user);
        self.update_summary(
            user,
            id,
            fields([
                ("hidden", Value::Bool(true)),
                ("unread_count", Value::from(0)),
                ("cleared_at", millis(Utc::now())),
            ]),
        )
        .await
    }

    async fn unsend_message(&self, id: &ConversationId, message_id: &MessageId) -> AgoraResult<Message> {
        let path = collections::message(id, message_id);
        let conversation_path = collections::conversation(id);

        let mut tx = self.store.begin().await?;
        let mut message: Message = tx
            .get(&path)
            .await?
            .ok_or_else(|| AgoraError::not_found("Message", message_id))?
            .decode()?;
        let mut conversation: Conversation = tx
            .get(&conversation_path)
            .await?
            .ok_or_else(|| AgoraError::not_found("Conversation", id))?
            .decode()?;
        let mut summaries = Vec::with_capacity(conversation.participants.len());
        for participant in &conversation.participants {
            let summary_path = collections::user_conversation(participant, id);
            if let Some(doc) = tx.get(&summary_path).await? {
                summaries.push((summary_path, doc.decode::<ConversationSummary>()?));
            }
        }

        message.unsent = true;
        message.text = None;
        message.media_url = None;
        tx.write(WriteOp::set(path, &message)?);

        let is_latest = |preview: &Option<MessagePreview>| {
            preview.as_ref().is_some_and(|p| &p.message_id == message_id)
        };
        if is_latest(&conversation.last_message) {
            if let Some(preview) = conversation.last_message.as_mut() {
                preview.text = UNSENT_PREVIEW.to_string();
            }
            tx.write(WriteOp::set(conversation_path, &conversation)?);
        }
        for (summary_path, mut summary) in summaries {
            if is_latest(&summary.last_message) {
                if let Some(preview) = summary.last_message.as_mut() {
                    preview.text = UNSENT_PREVIEW.to_string();
                }
                tx.write(WriteOp::set(summary_path, &summary)?);
            }
        }

        tx.commit().await?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::InMemoryDocumentStore;

    fn repo() -> ConversationRepositoryImpl {
        ConversationRepositoryImpl::new(Arc::new(InMemoryDocumentStore::new()))
    }

    fn text(conversation: &Conversation, sender: &UserId, body: &str) -> Message {
        Message::new(conversation.id.clone(), sender.clone(), Some(body.to_string()), None)
    }

    #[tokio::test]
    async fn test_peer_sees_conversation_after_first_message() {
        let repo = repo();
        let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
        let conversation = repo.get_or_create(&alice, &bob).await.unwrap();
        assert_eq!(conversation.id.as_str(), "alice_bob");

        assert_eq!(repo.list_summaries(&alice, &CursorRequest::first()).await.unwrap().len(), 1);
        assert!(repo.list_summaries(&bob, &CursorRequest::first()).await.unwrap().is_empty());

        repo.append_message(&text(&conversation, &alice, "hi")).await.unwrap();

        let inbox = repo.list_summaries(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.items[0].unread_count, 1);
        assert_eq!(inbox.items[0].peer_id, alice);
        assert_eq!(inbox.items[0].last_message.as_ref().unwrap().text, "hi");
    }

    #[tokio::test]
    async fn test_fan_out_counts_and_mark_read() {
        let repo = repo();
        let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
        let conversation = repo.get_or_create(&bob, &alice).await.unwrap();
        repo.append_message(&text(&conversation, &alice, "one")).await.unwrap();
        let updated = repo.append_message(&text(&conversation, &alice, "two")).await.unwrap();
        assert_eq!(updated.message_count, 2);

        let bob_summary = repo.find_summary(&bob, &conversation.id).await.unwrap().unwrap();
        let alice_summary = repo.find_summary(&alice, &conversation.id).await.unwrap().unwrap();
        assert_eq!(bob_summary.unread_count, 2);
        assert_eq!(alice_summary.unread_count, 0);

        repo.mark_read(&bob, &conversation.id).await.unwrap();
        let bob_summary = repo.find_summary(&bob, &conversation.id).await.unwrap().unwrap();
        assert_eq!(bob_summary.unread_count, 0);
    }

    #[tokio::test]
    async fn test_hide_then_new_message_reappears() {
        let repo = repo();
        let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
        let conversation = repo.get_or_create(&alice, &bob).await.unwrap();
        repo.append_message(&text(&conversation, &alice, "hi")).await.unwrap();

        repo.hide(&bob, &conversation.id).await.unwrap();
        assert!(repo.list_summaries(&bob, &CursorRequest::first()).await.unwrap().is_empty());
        let hidden = repo.find_summary(&bob, &conversation.id).await.unwrap().unwrap();
        assert!(hidden.cleared_at.is_some());

        repo.append_message(&text(&conversation, &alice, "again")).await.unwrap();
        let inbox = repo.list_summaries(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.items[0].unread_count, 1);
    }

    #[tokio::test]
    async fn test_unsend_latest_updates_previews() {
        let repo = repo();
        let (alice, bob) = (UserId::new("alice"), UserId::new("bob"));
        let conversation = repo.get_or_create(&alice, &bob).await.unwrap();
        let message = text(&conversation, &alice, "oops");
        repo.append_message(&message).await.unwrap();

        let unsent = repo.unsend_message(&conversation.id, &message.id).await.unwrap();
        assert!(unsent.unsent);
        assert!(unsent.text.is_none());

        let stored = repo.find(&conversation.id).await.unwrap().unwrap();
        assert_eq!(stored.last_message.unwrap().text, UNSENT_PREVIEW);
        let bob_summary = repo.find_summary(&bob, &conversation.id).await.unwrap().unwrap();
        assert_eq!(bob_summary.last_message.unwrap().text, UNSENT_PREVIEW);
    }

    #[tokio::test]
    async fn test_mark_read_without_summary_is_not_found() {
        let repo = repo();
        let err = repo
            .mark_read(&UserId::new("alice"), &ConversationId::new("alice_zed"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
