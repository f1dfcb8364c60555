//! Assignment catalog: posting and browsing exercises.

use std::sync::Arc;

use tracing::info;

use peerflow_domain::error::require_non_empty;
use peerflow_domain::{Assignment, AssignmentId, ScoringPolicy, UserId, ValidationError};
use peerflow_store::{AssignmentStore, NewAssignment, RecordStore, UserStore};

use crate::error::Result;

/// Assignment creation and catalog queries.
#[derive(Clone)]
pub struct AssignmentCatalog {
    store: Arc<dyn RecordStore>,
    policy: ScoringPolicy,
}

impl AssignmentCatalog {
    pub fn new(store: Arc<dyn RecordStore>, policy: ScoringPolicy) -> Self {
        Self { store, policy }
    }

    /// Post an assignment. `required_reviews` falls back to the policy
    /// default (3) when not given; submissions snapshot this value at
    /// creation time. Fails `NotFound` for an unknown author.
    pub async fn create(
        &self,
        author_id: UserId,
        title: String,
        description: String,
        category: String,
        difficulty: u8,
        required_reviews: Option<u32>,
    ) -> Result<Assignment> {
        require_non_empty("title", &title)?;
        require_non_empty("description", &description)?;
        require_non_empty("category", &category)?;
        if !(1..=5).contains(&difficulty) {
            return Err(ValidationError::DifficultyOutOfRange { difficulty }.into());
        }

        self.store.user(author_id).await?;

        let assignment = self
            .store
            .insert_assignment(NewAssignment {
                title,
                description,
                category,
                difficulty,
                author_id,
                required_reviews: required_reviews
                    .unwrap_or(self.policy.default_required_reviews),
            })
            .await?;

        info!(
            assignment_id = %assignment.id,
            author_id = %author_id,
            required_reviews = assignment.required_reviews,
            "assignment posted"
        );
        Ok(assignment)
    }

    /// Fetch an assignment. Fails `NotFound` if unknown.
    pub async fn get(&self, id: AssignmentId) -> Result<Assignment> {
        Ok(self.store.assignment(id).await?)
    }

    /// All assignments, unordered.
    pub async fn list(&self) -> Result<Vec<Assignment>> {
        Ok(self.store.list_assignments().await?)
    }

    /// Assignments with an exact category label.
    pub async fn by_category(&self, category: &str) -> Result<Vec<Assignment>> {
        Ok(self.store.assignments_by_category(category).await?)
    }

    /// Assignments at a difficulty grade.
    pub async fn by_difficulty(&self, difficulty: u8) -> Result<Vec<Assignment>> {
        Ok(self.store.assignments_by_difficulty(difficulty).await?)
    }
}
