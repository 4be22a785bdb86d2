//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `user_service.rs`).

pub mod auth_service_impl;
pub mod content_service_impl;
pub mod interaction_service_impl;
pub mod message_service_impl;
pub mod report_service_impl;
pub mod user_service_impl;

pub use auth_service_impl::AuthServiceImpl;
pub use content_service_impl::ContentServiceImpl;
pub use interaction_service_impl::InteractionServiceImpl;
pub use message_service_impl::MessageServiceImpl;
pub use report_service_impl::ReportServiceImpl;
pub use user_service_impl::UserServiceImpl;
