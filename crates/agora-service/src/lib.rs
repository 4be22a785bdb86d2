//! # Agora Service
//!
//! Business logic for the Agora social backend: accounts, profiles and the
//! social graph, posts, stories and feelings, reactions and comments,
//! direct messages, moderation reports and media uploads.
//!
//! Each service is a trait in its own module with the implementation under
//! [`r#impl`]. [`Services`] wires them over a shared [`ServiceContext`].

mod access;
mod context;
pub mod dto;
pub mod mail;
pub mod mappers;
pub mod media;
mod services;

pub mod auth_service;
pub mod content_service;
pub mod interaction_service;
pub mod media_service;
pub mod message_service;
pub mod report_service;
pub mod user_service;

pub mod r#impl;

#[cfg(test)]
mod test_support;

pub use context::ServiceContext;
pub use dto::*;
pub use mail::{mailer_from_config, DisabledMailer, LogMailer, MailComposer, MailMessage, Mailer};
pub use media::{media_host_from_config, HttpMediaHost, InMemoryMediaHost, MediaHost, MediaUpload};
pub use services::Services;

pub use auth_service::*;
pub use content_service::*;
pub use interaction_service::*;
pub use media_service::*;
pub use message_service::*;
pub use report_service::*;
pub use user_service::*;

pub use r#impl::*;
