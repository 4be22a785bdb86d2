//! Visibility and blocking rules shared by the services.

use crate::dto::UserSummary;
use agora_core::{AgoraError, AgoraResult, UserId, UserProfile};
use agora_repository::UserRepository;
use std::collections::HashMap;
use std::sync::Arc;

/// Whether either user blocked the other.
pub(crate) fn blocked_between(a: &UserProfile, b: &UserProfile) -> bool {
    a.has_blocked(&b.id) || b.has_blocked(&a.id)
}

/// Profile lookups with the visibility rules applied.
#[derive(Clone)]
pub(crate) struct Access {
    users: Arc<dyn UserRepository>,
}

impl Access {
    pub(crate) fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The caller's own profile.
    pub(crate) async fn viewer(&self, id: &UserId) -> AgoraResult<UserProfile> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::not_found("User", id))
    }

    /// A profile `viewer` may see. Blocked and inactive profiles are reported
    /// as missing; a viewer always sees themselves.
    pub(crate) async fn visible_user(&self, viewer: &UserProfile, id: &UserId) -> AgoraResult<UserProfile> {
        if &viewer.id == id {
            return Ok(viewer.clone());
        }
        let profile = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::not_found("User", id))?;

        if !profile.is_active() || blocked_between(viewer, &profile) {
            return Err(AgoraError::not_found("User", id));
        }
        Ok(profile)
    }

    /// Fails with `Forbidden` when `viewer` and `other` blocked each other.
    pub(crate) async fn ensure_can_interact(&self, viewer: &UserProfile, other: &UserId) -> AgoraResult<()> {
        if &viewer.id == other {
            return Ok(());
        }
        if viewer.has_blocked(other) {
            return Err(AgoraError::forbidden("You have blocked this user"));
        }
        let blocked_by_other = self
            .users
            .find_by_id(other)
            .await?
            .is_some_and(|profile| profile.has_blocked(&viewer.id));
        if blocked_by_other {
            return Err(AgoraError::forbidden("You cannot interact with this user"));
        }
        Ok(())
    }

    /// Summaries of the given users keyed by id, leaving out users hidden
    /// from `viewer`.
    pub(crate) async fn summaries(
        &self,
        viewer: &UserProfile,
        ids: &[UserId],
    ) -> AgoraResult<HashMap<UserId, UserSummary>> {
        let mut unique: Vec<UserId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let profiles = self.users.find_many(&unique).await?;
        Ok(profiles
            .into_iter()
            .filter(|p| p.id == viewer.id || (p.is_active() && !blocked_between(viewer, p)))
            .map(|p| (p.id.clone(), UserSummary::from(p)))
            .collect())
    }
}
