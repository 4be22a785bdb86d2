//! User-related DTOs.

use agora_core::validation::rules::{not_blank, password_strength, valid_username};
use agora_core::{AccountStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to update the caller's profile.
///
/// An empty `bio` or `avatar_url` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "valid_username", message = "Username must be 3-30 letters, digits, '_' or '.', starting with a letter"))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    #[validate(custom(function = "not_blank", message = "Display name cannot be blank"))]
    pub display_name: Option<String>,

    #[validate(length(max = 160, message = "Bio cannot exceed 160 characters"))]
    pub bio: Option<String>,

    pub avatar_url: Option<String>,
}

/// Request to change password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "password_strength", message = "Password must be at least 8 characters and contain a letter and a digit"))]
    pub new_password: String,
}

/// Request to schedule account deletion.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Full profile as seen by a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub status: AccountStatus,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    /// Only present on the caller's own profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follows_you: Option<bool>,
}

/// Short user entry used in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    pub following: bool,
    pub follower_count: i64,
}

/// Result of a block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResponse {
    pub blocked: bool,
}

/// Account lifecycle state after a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatusResponse {
    pub status: AccountStatus,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
}
