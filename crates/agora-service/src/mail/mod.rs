//! Outbound mail.
//!
//! Delivery is a collaborator: the [`Mailer`] trait is the seam, and the
//! backends here either log messages or drop them.

mod log_mailer;

pub use log_mailer::{DisabledMailer, LogMailer};

use agora_config::{MailBackend, MailConfig};
use agora_core::AgoraResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sends email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> AgoraResult<()>;
}

/// Builds the account emails with links under the public base URL.
#[derive(Debug, Clone)]
pub struct MailComposer {
    base_url: String,
}

impl MailComposer {
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        Self {
            base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Password reset email carrying a single-use token.
    #[must_use]
    pub fn password_reset(&self, to: &str, token: &str) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: "Reset your Agora password".to_string(),
            body: format!(
                "Someone asked to reset the password of your Agora account.\n\n\
                 Open this link to choose a new one:\n{}/reset-password?token={token}\n\n\
                 If it was not you, ignore this email.",
                self.base_url
            ),
        }
    }

    /// Email address verification email.
    #[must_use]
    pub fn email_verification(&self, to: &str, token: &str) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: "Verify your Agora email".to_string(),
            body: format!(
                "Welcome to Agora!\n\nConfirm your email address here:\n{}/verify-email?token={token}",
                self.base_url
            ),
        }
    }
}

/// Creates the mailer selected by the configuration.
#[must_use]
pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config.backend {
        MailBackend::Log => Arc::new(LogMailer::new(config.from_address.clone())),
        MailBackend::Disabled => Arc::new(DisabledMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_use_base_url() {
        let composer = MailComposer::new(&MailConfig {
            public_base_url: "https://agora.example/".to_string(),
            ..Default::default()
        });

        let reset = composer.password_reset("ada@example.com", "tok");
        assert_eq!(reset.to, "ada@example.com");
        assert!(reset.body.contains("https://agora.example/reset-password?token=tok"));

        let verify = composer.email_verification("ada@example.com", "v1");
        assert!(verify.body.contains("https://agora.example/verify-email?token=v1"));
    }
}
