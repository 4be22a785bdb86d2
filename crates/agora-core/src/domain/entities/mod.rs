//! Domain entities.

mod comment;
mod content;
mod conversation;
mod edge;
mod report;
mod user;

pub use comment::Comment;
pub use content::Content;
pub use conversation::{Conversation, ConversationSummary, Message, MessagePreview};
pub use edge::{Edge, SavedItem, UsernameReservation};
pub use report::Report;
pub use user::UserProfile;
