//! `UserRepositoryImpl`: profiles, usernames, follows and blocks.

use super::support::{decode_page, decode_present};
use crate::collections;
use crate::dao::{Direction, DocumentStore, Filter, Query, WriteOp};
use crate::traits::{ProfileChanges, ToggleOutcome, UserRepository};
use agora_core::{
    AccountStatus, AgoraError, AgoraResult, CursorPage, CursorRequest, Edge, SavedItem, UserId,
    UserProfile, UsernameReservation,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Upper bound appended to a prefix for range scans.
const PREFIX_END: char = '\u{f8ff}';

/// Repository implementation over a [`DocumentStore`].
pub struct UserRepositoryImpl {
    store: Arc<dyn DocumentStore>,
}

impl UserRepositoryImpl {
    /// Creates a new `UserRepositoryImpl` over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn list_edges(
        &self,
        collection: String,
        page: &CursorRequest,
    ) -> AgoraResult<CursorPage<Edge>> {
        let query = Query::collection(collection)
            .order_by("created_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }
}

fn user_not_found(id: &UserId) -> AgoraError {
    AgoraError::not_found("User", id)
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, id: &UserId) -> AgoraResult<Option<UserProfile>> {
        debug!("Repository: find_by_id {}", id);
        self.store
            .get(&collections::user(id))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> AgoraResult<Vec<UserProfile>> {
        let paths: Vec<_> = ids.iter().map(collections::user).collect();
        decode_present(self.store.get_all(&paths).await?)
    }

    async fn find_by_username(&self, username: &str) -> AgoraResult<Option<UserProfile>> {
        debug!("Repository: find_by_username {}", username);
        let Some(reservation) = self
            .store
            .get(&collections::username(&username.to_lowercase()))
            .await?
        else {
            return Ok(None);
        };
        let reservation: UsernameReservation = reservation.decode()?;
        self.find_by_id(&reservation.uid).await
    }

    async fn search_by_username_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> AgoraResult<Vec<UserProfile>> {
        let start = prefix.to_lowercase();
        let end = format!("{start}{PREFIX_END}");
        let query = Query::collection(collections::USERS)
            .filter(Filter::gte("username_lower", start))
            .filter(Filter::lt("username_lower", end))
            .order_by("username_lower", Direction::Ascending)
            .limit(limit);
        self.store
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    async fn create(&self, profile: &UserProfile) -> AgoraResult<()> {
        debug!("Repository: create profile {} ({})", profile.id, profile.username);
        let username_path = collections::username(&profile.username_lower);
        let profile_path = collections::user(&profile.id);

        let mut tx = self.store.begin().await?;
        if tx.get(&username_path).await?.is_some() {
            return Err(AgoraError::conflict("Username is already taken"));
        }
        if tx.get(&profile_path).await?.is_some() {
            return Err(AgoraError::conflict("Profile already exists"));
        }
        tx.write(WriteOp::create(
            username_path,
            &UsernameReservation {
                uid: profile.id.clone(),
            },
        )?);
        tx.write(WriteOp::create(profile_path, profile)?);
        tx.commit().await
    }

    async fn update_profile(&self, id: &UserId, changes: ProfileChanges) -> AgoraResult<UserProfile> {
        let path = collections::user(id);
        let mut tx = self.store.begin().await?;
        let mut profile: UserProfile = tx
            .get(&path)
            .await?
            .ok_or_else(|| user_not_found(id))?
            .decode()?;

        let mut reservation_ops = Vec::new();
        if let Some(username) = changes.username {
            let lower = username.to_lowercase();
            if lower != profile.username_lower {
                let new_path = collections::username(&lower);
                if tx.get(&new_path).await?.is_some() {
                    return Err(AgoraError::conflict("Username is already taken"));
                }
                reservation_ops.push(WriteOp::create(
                    new_path,
                    &UsernameReservation { uid: id.clone() },
                )?);
                reservation_ops.push(WriteOp::delete(collections::username(&profile.username_lower)));
            }
            profile.username = username;
            profile.username_lower = lower;
        }
        if let Some(display_name) = changes.display_name {
            profile.display_name = display_name;
        }
        if let Some(bio) = changes.bio {
            profile.bio = bio;
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = avatar_url;
        }
        profile.updated_at = Utc::now();

        for op in reservation_ops {
            tx.write(op);
        }
        tx.write(WriteOp::set(path, &profile)?);
        tx.commit().await?;
        Ok(profile)
    }

    async fn set_status(
        &self,
        id: &UserId,
        status: AccountStatus,
        deletion_scheduled_for: Option<DateTime<Utc>>,
    ) -> AgoraResult<UserProfile> {
        debug!("Repository: set_status {} -> {}", id, status);
        let path = collections::user(id);
        let mut tx = self.store.begin().await?;
        let mut profile: UserProfile = tx
            .get(&path)
            .await?
            .ok_or_else(|| user_not_found(id))?
            .decode()?;

        let now = Utc::now();
        profile.status = status;
        profile.deactivated_at = (status == AccountStatus::Deactivated).then_some(now);
        profile.deletion_scheduled_for = if status == AccountStatus::PendingDeletion {
            deletion_scheduled_for
        } else {
            None
        };
        profile.updated_at = now;

        tx.write(WriteOp::set(path, &profile)?);
        tx.commit().await?;
        Ok(profile)
    }

    async fn toggle_follow(&self, follower: &UserId, target: &UserId) -> AgoraResult<ToggleOutcome> {
        debug!("Repository: toggle_follow {} -> {}", follower, target);
        let follower_path = collections::user(follower);
        let target_path = collections::user(target);
        let following_edge = collections::following_edge(follower, target);
        let follower_edge = collections::follower_edge(target, follower);

        let mut tx = self.store.begin().await?;
        if tx.get(&follower_path).await?.is_none() {
            return Err(user_not_found(follower));
        }
        let target_doc = tx
            .get(&target_path)
            .await?
            .ok_or_else(|| user_not_found(target))?;
        let current = target_doc.get_i64("follower_count");
        let following = tx.get(&following_edge).await?.is_some();

        let outcome = if following {
            tx.write(WriteOp::delete(following_edge));
            tx.write(WriteOp::delete(follower_edge));
            tx.write(WriteOp::increment(follower_path, "following_count", -1));
            tx.write(WriteOp::increment(target_path, "follower_count", -1));
            ToggleOutcome {
                active: false,
                count: (current - 1).max(0),
            }
        } else {
            tx.write(WriteOp::set(following_edge, &Edge::now(target.clone()))?);
            tx.write(WriteOp::set(follower_edge, &Edge::now(follower.clone()))?);
            tx.write(WriteOp::increment(follower_path, "following_count", 1));
            tx.write(WriteOp::increment(target_path, "follower_count", 1));
            ToggleOutcome {
                active: true,
                count: current + 1,
            }
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn is_following(&self, follower: &UserId, target: &UserId) -> AgoraResult<bool> {
        Ok(self
            .store
            .get(&collections::following_edge(follower, target))
            .await?
            .is_some())
    }

    async fn list_followers(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>> {
        self.list_edges(collections::user(id).subcollection(collections::FOLLOWERS), page)
            .await
    }

    async fn list_following(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<Edge>> {
        self.list_edges(collections::user(id).subcollection(collections::FOLLOWING), page)
            .await
    }

    async fn following_ids(&self, id: &UserId, limit: usize) -> AgoraResult<Vec<UserId>> {
        let query = Query::collection(collections::user(id).subcollection(collections::FOLLOWING))
            .order_by("created_at", Direction::Descending)
            .limit(limit);
        Ok(self
            .store
            .query(&query)
            .await?
            .iter()
            .map(|doc| UserId::new(doc.id()))
            .collect())
    }

    async fn toggle_block(&self, blocker: &UserId, target: &UserId) -> AgoraResult<bool> {
        debug!("Repository: toggle_block {} -> {}", blocker, target);
        let blocker_path = collections::user(blocker);
        let target_path = collections::user(target);
        let outgoing = collections::following_edge(blocker, target);
        let incoming = collections::following_edge(target, blocker);

        let mut tx = self.store.begin().await?;
        let mut profile: UserProfile = tx
            .get(&blocker_path)
            .await?
            .ok_or_else(|| user_not_found(blocker))?
            .decode()?;
        if tx.get(&target_path).await?.is_none() {
            return Err(user_not_found(target));
        }
        let follows_target = tx.get(&outgoing).await?.is_some();
        let followed_by_target = tx.get(&incoming).await?.is_some();

        let blocked = if profile.has_blocked(target) {
            profile.blocked_users.retain(|id| id != target);
            false
        } else {
            profile.blocked_users.push(target.clone());
            if follows_target {
                tx.write(WriteOp::delete(outgoing));
                tx.write(WriteOp::delete(collections::follower_edge(target, blocker)));
                tx.write(WriteOp::increment(target_path.clone(), "follower_count", -1));
                profile.following_count = (profile.following_count - 1).max(0);
            }
            if followed_by_target {
                tx.write(WriteOp::delete(incoming));
                tx.write(WriteOp::delete(collections::follower_edge(blocker, target)));
                tx.write(WriteOp::increment(target_path, "following_count", -1));
                profile.follower_count = (profile.follower_count - 1).max(0);
            }
            true
        };
        profile.updated_at = Utc::now();
        tx.write(WriteOp::set(blocker_path, &profile)?);
        tx.commit().await?;
        Ok(blocked)
    }

    async fn list_saved(&self, id: &UserId, page: &CursorRequest) -> AgoraResult<CursorPage<SavedItem>> {
        let query = Query::collection(collections::user(id).subcollection(collections::SAVED))
            .order_by("saved_at", Direction::Descending)
            .limit(page.fetch_limit())
            .start_after(page.cursor());
        decode_page(self.store.query(&query).await?, page)
    }
}
