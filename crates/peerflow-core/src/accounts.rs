//! User accounts: registration, lookup, search, and aggregate stats.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use peerflow_domain::error::require_non_empty;
use peerflow_domain::{User, UserId};
use peerflow_store::{
    NewUser, RecordStore, ReviewStore, StorageError, SubmissionStore, UserStore,
};

use crate::error::{EngineError, Result};

/// Aggregate view of a user's standing, served to dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub points: u64,
    pub level: u32,
    pub total_xp: u64,
    pub submissions_count: usize,
    pub reviews_count: usize,
    /// Mean rating the user has given across their reviews; 0 when none.
    pub average_rating_given: f64,
}

/// Registration and user queries over the record store.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn RecordStore>,
}

impl Accounts {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Register a new user. Fails `UsernameTaken` if the name exists.
    pub async fn register(&self, username: String, bio: Option<String>) -> Result<User> {
        require_non_empty("username", &username)?;

        let new = NewUser {
            username: username.clone(),
            bio,
        };
        match self.store.insert_user(new).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user registered");
                Ok(user)
            }
            Err(StorageError::Conflict { .. }) => Err(EngineError::UsernameTaken { username }),
            Err(other) => Err(other.into()),
        }
    }

    /// Fetch a user by id. Fails `NotFound` if unknown.
    pub async fn user(&self, id: UserId) -> Result<User> {
        Ok(self.store.user(id).await?)
    }

    /// Fetch a user by exact username, if registered.
    pub async fn by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.store.user_by_username(username).await?)
    }

    /// Case-insensitive username substring search.
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        Ok(self.store.search_users(query).await?)
    }

    /// Aggregate stats for a user. Fails `NotFound` if unknown.
    pub async fn stats(&self, user_id: UserId) -> Result<UserStats> {
        let user = self.store.user(user_id).await?;
        let submissions = self.store.submissions_by_author(user_id).await?;
        let reviews = self.store.reviews_by_reviewer(user_id).await?;

        let average_rating_given = if reviews.is_empty() {
            0.0
        } else {
            let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
            sum as f64 / reviews.len() as f64
        };

        Ok(UserStats {
            points: user.points,
            level: user.level(),
            total_xp: user.total_xp,
            submissions_count: submissions.len(),
            reviews_count: reviews.len(),
            average_rating_given,
        })
    }
}
