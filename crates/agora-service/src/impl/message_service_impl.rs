//! Direct messaging service implementation.

use crate::access::blocked_between;
use crate::context::ServiceContext;
use crate::dto::{ConversationResponse, DirectMessageResponse, SendMessageRequest};
use crate::message_service::MessageService;
use agora_core::{
    AgoraError, AgoraResult, Conversation, ConversationId, ConversationSummary, CursorPage,
    CursorRequest, Message, MessageId, UserId, ValidateExt,
};
use async_trait::async_trait;
use tracing::{debug, info};

/// Message service implementation.
pub struct MessageServiceImpl {
    ctx: ServiceContext,
}

impl MessageServiceImpl {
    /// Creates a new message service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Loads a conversation the viewer takes part in.
    async fn participant_of(&self, viewer: &UserId, id: &ConversationId) -> AgoraResult<Conversation> {
        let conversation = self
            .ctx
            .repos
            .conversations
            .find(id)
            .await?
            .ok_or_else(|| AgoraError::not_found("Conversation", id))?;

        if !conversation.has_participant(viewer) {
            return Err(AgoraError::forbidden("You are not part of this conversation"));
        }
        Ok(conversation)
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn start_conversation(&self, viewer: &UserId, peer: &UserId) -> AgoraResult<ConversationResponse> {
        if viewer == peer {
            return Err(AgoraError::validation("You cannot message yourself"));
        }

        let profile = self.ctx.access.viewer(viewer).await?;
        let peer_profile = self
            .ctx
            .repos
            .users
            .find_by_id(peer)
            .await?
            .filter(|p| p.is_active())
            .ok_or_else(|| AgoraError::not_found("User", peer))?;
        if blocked_between(&profile, &peer_profile) {
            return Err(AgoraError::forbidden("You cannot message this user"));
        }

        let conversation = self.ctx.repos.conversations.get_or_create(viewer, peer).await?;
        let summary = self
            .ctx
            .repos
            .conversations
            .find_summary(viewer, &conversation.id)
            .await?
            .unwrap_or_else(|| ConversationSummary::new(conversation.id.clone(), peer.clone()));

        info!("Conversation {} opened by {}", conversation.id, viewer);
        Ok(ConversationResponse::from_summary(summary, Some(peer_profile.into())))
    }

    async fn list_conversations(
        &self,
        viewer: &UserId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<ConversationResponse>> {
        let summaries = self.ctx.repos.conversations.list_summaries(viewer, page).await?;

        let peer_ids: Vec<UserId> = summaries.items.iter().map(|s| s.peer_id.clone()).collect();
        let peers = self.ctx.repos.users.find_many(&peer_ids).await?;

        let items = summaries
            .items
            .into_iter()
            .map(|summary| {
                let peer = peers.iter().find(|p| p.id == summary.peer_id).map(Into::into);
                ConversationResponse::from_summary(summary, peer)
            })
            .collect();
        Ok(CursorPage::new(items, summaries.next_cursor))
    }

    async fn list_messages(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<DirectMessageResponse>> {
        self.participant_of(viewer, id).await?;

        let cleared_at = self
            .ctx
            .repos
            .conversations
            .find_summary(viewer, id)
            .await?
            .and_then(|s| s.cleared_at);

        let messages = self
            .ctx
            .repos
            .conversations
            .list_messages(id, page, cleared_at)
            .await?;
        Ok(messages.map(|m| DirectMessageResponse::for_viewer(m, viewer)))
    }

    async fn send_message(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        request: SendMessageRequest,
    ) -> AgoraResult<DirectMessageResponse> {
        request.validate_request()?;

        let text = request.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let media_url = request.media_url.filter(|u| !u.trim().is_empty());
        if text.is_none() && media_url.is_none() {
            return Err(AgoraError::validation("A message needs text or media"));
        }
        let limit = self.ctx.social.max_message_length;
        if text.as_ref().is_some_and(|t| t.chars().count() > limit) {
            return Err(AgoraError::validation(format!(
                "Message cannot exceed {limit} characters"
            )));
        }

        let conversation = self.participant_of(viewer, id).await?;
        let peer = conversation
            .peer_of(viewer)
            .ok_or_else(|| AgoraError::internal(format!("Conversation {id} has no peer")))?;
        let profile = self.ctx.access.viewer(viewer).await?;
        self.ctx.access.ensure_can_interact(&profile, peer).await?;

        let message = Message::new(id.clone(), viewer.clone(), text, media_url);
        self.ctx.repos.conversations.append_message(&message).await?;

        debug!("Message {} sent in {}", message.id, id);
        Ok(DirectMessageResponse::for_viewer(message, viewer))
    }

    async fn mark_read(&self, viewer: &UserId, id: &ConversationId) -> AgoraResult<()> {
        self.participant_of(viewer, id).await?;
        self.ctx.repos.conversations.mark_read(viewer, id).await
    }

    async fn delete_conversation(&self, viewer: &UserId, id: &ConversationId) -> AgoraResult<()> {
        self.participant_of(viewer, id).await?;
        self.ctx.repos.conversations.hide(viewer, id).await?;

        info!("Conversation {} deleted for {}", id, viewer);
        Ok(())
    }

    async fn unsend_message(
        &self,
        viewer: &UserId,
        id: &ConversationId,
        message_id: &MessageId,
    ) -> AgoraResult<DirectMessageResponse> {
        self.participant_of(viewer, id).await?;
        let message = self
            .ctx
            .repos
            .conversations
            .find_message(id, message_id)
            .await?
            .ok_or_else(|| AgoraError::not_found("Message", message_id))?;

        if &message.sender_id != viewer {
            return Err(AgoraError::forbidden("You can only unsend your own messages"));
        }
        if message.unsent {
            return Ok(DirectMessageResponse::for_viewer(message, viewer));
        }

        let message = self
            .ctx
            .repos
            .conversations
            .unsend_message(id, message_id)
            .await?;

        info!("Message {} unsent in {}", message_id, id);
        Ok(DirectMessageResponse::for_viewer(message, viewer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    fn text(body: &str) -> SendMessageRequest {
        SendMessageRequest {
            text: Some(body.to_string()),
            media_url: None,
        }
    }

    #[tokio::test]
    async fn test_conversation_flow() {
        let fixture = Fixture::new();
        let service = MessageServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;

        let opened = service.start_conversation(&ada, &bob).await.unwrap();
        assert_eq!(opened.peer_id, bob);
        assert_eq!(opened.peer.as_ref().unwrap().username, "bob");

        let bob_list = service.list_conversations(&bob, &CursorRequest::first()).await.unwrap();
        assert!(bob_list.is_empty());

        service.send_message(&ada, &opened.id, text("hi bob")).await.unwrap();
        service.send_message(&ada, &opened.id, text("you there?")).await.unwrap();

        let bob_list = service.list_conversations(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(bob_list.items.len(), 1);
        assert_eq!(bob_list.items[0].unread_count, 2);
        assert_eq!(bob_list.items[0].last_message.as_ref().unwrap().text, "you there?");

        let messages = service
            .list_messages(&bob, &opened.id, &CursorRequest::first())
            .await
            .unwrap();
        assert_eq!(messages.items[0].text.as_deref(), Some("you there?"));
        assert!(!messages.items[0].is_mine);

        service.mark_read(&bob, &opened.id).await.unwrap();
        let bob_list = service.list_conversations(&bob, &CursorRequest::first()).await.unwrap();
        assert_eq!(bob_list.items[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_send_rules() {
        let fixture = Fixture::new();
        let service = MessageServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let eve = fixture.user("eve").await;
        let opened = service.start_conversation(&ada, &bob).await.unwrap();

        let empty = service
            .send_message(&ada, &opened.id, SendMessageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(empty.status_code(), 400);

        let outsider = service.send_message(&eve, &opened.id, text("psst")).await.unwrap_err();
        assert_eq!(outsider.status_code(), 403);

        assert!(service.start_conversation(&ada, &ada).await.is_err());

        fixture.repos.users.toggle_block(&bob, &ada).await.unwrap();
        let blocked = service.send_message(&ada, &opened.id, text("hello?")).await.unwrap_err();
        assert_eq!(blocked.status_code(), 403);
        let reopen = service.start_conversation(&ada, &bob).await.unwrap_err();
        assert_eq!(reopen.status_code(), 403);
    }

    #[tokio::test]
    async fn test_delete_hides_history_for_one_side() {
        let fixture = Fixture::new();
        let service = MessageServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let opened = service.start_conversation(&ada, &bob).await.unwrap();
        service.send_message(&ada, &opened.id, text("old news")).await.unwrap();

        service.delete_conversation(&bob, &opened.id).await.unwrap();
        assert!(service
            .list_conversations(&bob, &CursorRequest::first())
            .await
            .unwrap()
            .is_empty());
        let bob_view = service
            .list_messages(&bob, &opened.id, &CursorRequest::first())
            .await
            .unwrap();
        assert!(bob_view.is_empty());

        let ada_view = service
            .list_messages(&ada, &opened.id, &CursorRequest::first())
            .await
            .unwrap();
        assert_eq!(ada_view.items.len(), 1);
    }

    #[tokio::test]
    async fn test_only_sender_can_unsend() {
        let fixture = Fixture::new();
        let service = MessageServiceImpl::new(fixture.context());
        let ada = fixture.user("ada").await;
        let bob = fixture.user("bob").await;
        let opened = service.start_conversation(&ada, &bob).await.unwrap();
        let sent = service.send_message(&ada, &opened.id, text("oops")).await.unwrap();

        let err = service.unsend_message(&bob, &opened.id, &sent.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let unsent = service.unsend_message(&ada, &opened.id, &sent.id).await.unwrap();
        assert!(unsent.unsent);
        assert!(unsent.text.is_none());
    }
}
