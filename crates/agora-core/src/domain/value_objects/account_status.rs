//! Account lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Visible and usable.
    #[default]
    Active,
    /// Hidden until the owner signs in again.
    Deactivated,
    /// Scheduled for purge; signing in during the grace period restores it.
    PendingDeletion,
}

impl AccountStatus {
    /// Whether the profile is visible to other users.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the snake_case status name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deactivated => "deactivated",
            Self::PendingDeletion => "pending_deletion",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
