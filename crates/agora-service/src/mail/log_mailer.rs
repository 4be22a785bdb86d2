use super::{MailMessage, Mailer};
use agora_core::AgoraResult;
use async_trait::async_trait;
use tracing::{debug, info};

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> AgoraResult<()> {
        info!(from = %self.from, to = %message.to, subject = %message.subject, "Mail sent");
        debug!("Mail body:\n{}", message.body);
        Ok(())
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, message: &MailMessage) -> AgoraResult<()> {
        debug!(to = %message.to, "Mail disabled, dropping message");
        Ok(())
    }
}
