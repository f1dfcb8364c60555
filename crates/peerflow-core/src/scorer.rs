//! Review scorer: the multi-step sequence that turns a review action into
//! a persisted review, a ledger step, and progression awards.

use std::sync::Arc;

use tracing::info;

use peerflow_domain::{Review, ScoringPolicy, SubmissionId, UserId};
use peerflow_store::{NewReview, RecordStore, ReviewStore, SubmissionStore};

use crate::error::{EngineError, Result};
use crate::ledger::SubmissionLedger;
use crate::locks::LockMap;
use crate::progression::UserProgression;

/// Records reviews and drives the ledger and progression as one unit of
/// work per submission.
#[derive(Clone)]
pub struct ReviewScorer {
    store: Arc<dyn RecordStore>,
    ledger: SubmissionLedger,
    progression: UserProgression,
    policy: ScoringPolicy,
    submission_locks: Arc<LockMap<SubmissionId>>,
}

impl ReviewScorer {
    /// `submission_locks` must be the same map the ledger locks with;
    /// the scorer holds the submission's lock across the whole sequence
    /// and runs the ledger's increment step inside it without relocking.
    pub fn new(
        store: Arc<dyn RecordStore>,
        ledger: SubmissionLedger,
        progression: UserProgression,
        policy: ScoringPolicy,
        submission_locks: Arc<LockMap<SubmissionId>>,
    ) -> Self {
        Self {
            store,
            ledger,
            progression,
            policy,
            submission_locks,
        }
    }

    /// Submit a review of a submission.
    ///
    /// Sequence, all-or-nothing under the submission's lock:
    /// 1. validate rating and feedback;
    /// 2. reject if the submission already met its quota
    ///    (`AlreadyFullyReviewed`);
    /// 3. classify quality from feedback length and persist the review;
    /// 4. count it on the ledger;
    /// 5. pay the reviewer;
    /// 6. if step 4 completed the submission, award the author
    ///    `floor(mean_rating * 20)` experience.
    ///
    /// Nothing stops a reviewer from reviewing the same submission twice
    /// while it still needs reviews; the matcher just stops offering it.
    pub async fn submit_review(
        &self,
        submission_id: SubmissionId,
        reviewer_id: UserId,
        rating: u8,
        feedback: String,
    ) -> Result<Review> {
        self.policy.validate_review(rating, &feedback)?;

        let _guard = self.submission_locks.acquire(submission_id).await;

        let submission = self.store.submission(submission_id).await?;
        if submission.fully_reviewed() {
            return Err(EngineError::AlreadyFullyReviewed { submission_id });
        }

        let quality = self.policy.classify(&feedback);
        let points_awarded = self.policy.points_for(quality);

        let review = self
            .store
            .insert_review(NewReview {
                submission_id,
                reviewer_id,
                rating,
                feedback,
                quality,
                points_awarded,
            })
            .await?;

        let progress = self.ledger.record_review_locked(submission_id).await?;
        self.progression
            .add_points(reviewer_id, u64::from(points_awarded))
            .await?;

        if progress.completed_now {
            let reviews = self.store.reviews_by_submission(submission_id).await?;
            let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
            let xp = self.policy.completion_xp(&ratings);
            self.progression
                .add_experience(progress.submission.author_id, xp)
                .await?;
        }

        info!(
            review_id = %review.id,
            submission_id = %submission_id,
            reviewer_id = %reviewer_id,
            quality = %review.quality,
            points_awarded,
            "review recorded"
        );
        Ok(review)
    }

    /// All reviews of one submission.
    pub async fn reviews_for(&self, submission_id: SubmissionId) -> Result<Vec<Review>> {
        Ok(self.store.reviews_by_submission(submission_id).await?)
    }
}
