//! User profile entity.

use crate::domain::AccountStatus;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile stored at `users/{uid}`.
///
/// The uid is the identity-provider account id; credentials never live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    /// Lowercased username, used for prefix search and uniqueness.
    pub username_lower: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub post_count: i64,
    /// Reports filed against this user.
    #[serde(default)]
    pub report_count: i64,
    /// Users this user has blocked.
    #[serde(default)]
    pub blocked_users: Vec<UserId>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub deactivated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates an active profile with zeroed counters.
    #[must_use]
    pub fn new(id: UserId, username: &str, display_name: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            display_name: display_name.to_string(),
            email: email.to_lowercase(),
            bio: None,
            avatar_url: None,
            status: AccountStatus::Active,
            follower_count: 0,
            following_count: 0,
            post_count: 0,
            report_count: 0,
            blocked_users: Vec::new(),
            deactivated_at: None,
            deletion_scheduled_for: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the profile is visible to others.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this user blocked `other`.
    #[must_use]
    pub fn has_blocked(&self, other: &UserId) -> bool {
        self.blocked_users.contains(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile() {
        let profile = UserProfile::new(UserId::new("u1"), "Jane_Doe", "Jane", "Jane@Example.com");
        assert_eq!(profile.username_lower, "jane_doe");
        assert_eq!(profile.email, "jane@example.com");
        assert!(profile.is_active());
        assert_eq!(profile.follower_count, 0);
    }

    #[test]
    fn test_timestamps_serialize_as_millis() {
        let profile = UserProfile::new(UserId::new("u1"), "jane", "Jane", "j@e.com");
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value["created_at"].is_i64());
        assert!(value["deactivated_at"].is_null());
        let back: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(back.created_at.timestamp_millis(), profile.created_at.timestamp_millis());
    }

    #[test]
    fn test_has_blocked() {
        let mut profile = UserProfile::new(UserId::new("u1"), "jane", "Jane", "j@e.com");
        profile.blocked_users.push(UserId::new("u2"));
        assert!(profile.has_blocked(&UserId::new("u2")));
        assert!(!profile.has_blocked(&UserId::new("u3")));
    }
}
