//! User progression: point and experience accumulation.
//!
//! Both currencies are monotonic - no decrement operation exists. The
//! level is derived from total experience by `User::level()`, so there is
//! nothing here to keep in sync.

use std::sync::Arc;

use tracing::info;

use peerflow_domain::{User, UserId};
use peerflow_store::{RecordStore, UserStore};

use crate::error::Result;
use crate::locks::LockMap;

/// Point/experience accumulation over user records.
#[derive(Clone)]
pub struct UserProgression {
    store: Arc<dyn RecordStore>,
    locks: Arc<LockMap<UserId>>,
}

impl UserProgression {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<LockMap<UserId>>) -> Self {
        Self { store, locks }
    }

    /// Add PRP points to a user. Fails `NotFound` for an unknown user.
    pub async fn add_points(&self, user_id: UserId, delta: u64) -> Result<User> {
        let _guard = self.locks.acquire(user_id).await;

        let mut user = self.store.user(user_id).await?;
        user.points += delta;
        self.store.update_user(&user).await?;

        info!(user_id = %user_id, delta, points = user.points, "awarded PRP points");
        Ok(user)
    }

    /// Add experience to a user. Fails `NotFound` for an unknown user.
    pub async fn add_experience(&self, user_id: UserId, delta: u64) -> Result<User> {
        let _guard = self.locks.acquire(user_id).await;

        let mut user = self.store.user(user_id).await?;
        user.total_xp += delta;
        self.store.update_user(&user).await?;

        info!(
            user_id = %user_id,
            delta,
            total_xp = user.total_xp,
            level = user.level(),
            "awarded experience"
        );
        Ok(user)
    }
}
