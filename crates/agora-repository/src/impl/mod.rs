//! Repository layer implementations.
//!
//! Trait definitions live in the parent module (`traits.rs`).
//! This module contains concrete structs that implement those traits
//! over a [`DocumentStore`](crate::dao::DocumentStore).

mod support;

pub mod comment_repository_impl;
pub mod content_repository_impl;
pub mod conversation_repository_impl;
pub mod report_repository_impl;
pub mod user_repository_impl;

pub use comment_repository_impl::CommentRepositoryImpl;
pub use content_repository_impl::ContentRepositoryImpl;
pub use conversation_repository_impl::ConversationRepositoryImpl;
pub use report_repository_impl::ReportRepositoryImpl;
pub use user_repository_impl::UserRepositoryImpl;
