//! Submission ledger: lifecycle and review-count tracking.

use std::sync::Arc;

use tracing::info;

use peerflow_domain::error::require_non_empty;
use peerflow_domain::{AssignmentId, Submission, SubmissionId, SubmissionStatus, UserId};
use peerflow_store::{AssignmentStore, NewSubmission, RecordStore, SubmissionStore};

use crate::error::Result;
use crate::locks::LockMap;

/// Outcome of one [`SubmissionLedger::record_review`] step.
#[derive(Debug, Clone)]
pub struct ReviewProgress {
    /// The submission after the increment.
    pub submission: Submission,

    /// Whether THIS step performed the Pending -> Completed transition.
    /// At most one step per submission ever reports true.
    pub completed_now: bool,
}

/// Submission lifecycle over the record store.
#[derive(Clone)]
pub struct SubmissionLedger {
    store: Arc<dyn RecordStore>,
    locks: Arc<LockMap<SubmissionId>>,
}

impl SubmissionLedger {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<LockMap<SubmissionId>>) -> Self {
        Self { store, locks }
    }

    /// Create a submission against an assignment.
    ///
    /// The review quota is snapshotted from the assignment's configured
    /// `required_reviews` at this moment. Fails `NotFound` if the
    /// assignment does not resolve.
    pub async fn create(
        &self,
        assignment_id: AssignmentId,
        author_id: UserId,
        content: String,
    ) -> Result<Submission> {
        require_non_empty("content", &content)?;

        let assignment = self.store.assignment(assignment_id).await?;
        let submission = self
            .store
            .insert_submission(NewSubmission {
                assignment_id,
                author_id,
                content,
                reviews_required: assignment.required_reviews,
            })
            .await?;

        info!(
            submission_id = %submission.id,
            assignment_id = %assignment_id,
            reviews_required = submission.reviews_required,
            "submission created"
        );
        Ok(submission)
    }

    /// Fetch a submission. Fails `NotFound` if unknown.
    pub async fn get(&self, id: SubmissionId) -> Result<Submission> {
        Ok(self.store.submission(id).await?)
    }

    /// Unordered snapshot of an assignment's submissions.
    pub async fn by_assignment(&self, assignment_id: AssignmentId) -> Result<Vec<Submission>> {
        Ok(self.store.submissions_by_assignment(assignment_id).await?)
    }

    /// Unordered snapshot of a user's submissions.
    pub async fn by_author(&self, author_id: UserId) -> Result<Vec<Submission>> {
        Ok(self.store.submissions_by_author(author_id).await?)
    }

    /// Count one more review on a submission; complete it when the quota
    /// is met. One atomic step under the submission's lock.
    ///
    /// The increment is unconditional - callers that must not push a
    /// fully-reviewed submission further (the scorer) check before
    /// calling, under the same lock. Completion is terminal: a Completed
    /// submission never reverts, and later steps report
    /// `completed_now = false`.
    pub async fn record_review(&self, id: SubmissionId) -> Result<ReviewProgress> {
        let _guard = self.locks.acquire(id).await;
        self.record_review_locked(id).await
    }

    /// The increment step without taking the lock. The caller must hold
    /// the submission's lock from the same shared [`LockMap`].
    pub(crate) async fn record_review_locked(&self, id: SubmissionId) -> Result<ReviewProgress> {
        let mut submission = self.store.submission(id).await?;

        submission.reviews_received += 1;
        let completed_now =
            submission.status == SubmissionStatus::Pending && submission.fully_reviewed();
        if completed_now {
            submission.status = SubmissionStatus::Completed;
        }
        self.store.update_submission(&submission).await?;

        if completed_now {
            info!(
                submission_id = %id,
                reviews_received = submission.reviews_received,
                "submission completed"
            );
        }
        Ok(ReviewProgress {
            submission,
            completed_now,
        })
    }
}
