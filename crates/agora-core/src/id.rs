//! Typed ID wrappers for documents.
//!
//! Identifiers are opaque strings: user ids are issued by the identity
//! provider, everything else is generated here as a time-ordered UUID so
//! that document ids sort roughly by creation time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a new time-ordered id.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Wraps an existing id.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identity-provider account id, also the `users/{uid}` document id.
    UserId
);
string_id!(
    /// Id of a post, story or feeling.
    ContentId
);
string_id!(
    /// Comment id within a content item.
    CommentId
);
string_id!(
    /// Direct conversation id.
    ConversationId
);
string_id!(
    /// Message id within a conversation.
    MessageId
);
string_id!(
    /// Moderation report id.
    ReportId
);

impl ConversationId {
    /// Deterministic id for the direct conversation between two users.
    ///
    /// The id is the same regardless of argument order.
    #[must_use]
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{low}_{high}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ContentId::generate();
        let b = ContentId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_conversation_id_is_order_independent() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        assert_eq!(ConversationId::between(&alice, &bob), ConversationId::between(&bob, &alice));
        assert_eq!(ConversationId::between(&alice, &bob).as_str(), "alice_bob");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = UserId::new("u-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-1\"");
        let back: UserId = serde_json::from_str("\"u-1\"").unwrap();
        assert_eq!(back, id);
    }
}
