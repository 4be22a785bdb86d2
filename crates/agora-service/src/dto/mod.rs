//! Data Transfer Objects (DTOs).

mod auth_dto;
mod content_dto;
mod interaction_dto;
mod media_dto;
mod message_dto;
mod report_dto;
mod user_dto;

pub use auth_dto::*;
pub use content_dto::*;
pub use interaction_dto::*;
pub use media_dto::*;
pub use message_dto::*;
pub use report_dto::*;
pub use user_dto::*;
