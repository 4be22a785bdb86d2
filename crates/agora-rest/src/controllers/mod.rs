//! REST API controllers.

pub mod auth_controller;
pub mod content_controller;
pub mod health_controller;
pub mod interaction_controller;
pub mod media_controller;
pub mod message_controller;
pub mod report_controller;
pub mod user_controller;

pub use health_controller::*;
