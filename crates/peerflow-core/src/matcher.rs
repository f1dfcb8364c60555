//! Review matcher: derives a user's eligible-to-review queue.

use std::collections::HashSet;
use std::sync::Arc;

use peerflow_domain::{Submission, SubmissionId, SubmissionStatus, UserId};
use peerflow_store::{RecordStore, ReviewStore, SubmissionStore};

use crate::error::Result;

/// Read-only query over the submission ledger.
///
/// The queue is recomputed on every call - there is no reservation, so
/// two reviewers may see and act on the same submission concurrently.
/// The scorer's quota check resolves that race.
#[derive(Clone)]
pub struct ReviewMatcher {
    store: Arc<dyn RecordStore>,
}

impl ReviewMatcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Submissions the user may review right now: Pending, not their
    /// own, still short of the quota, and not already reviewed by them.
    /// Unordered.
    pub async fn pending_for(&self, user_id: UserId) -> Result<Vec<Submission>> {
        let reviewed: HashSet<SubmissionId> = self
            .store
            .reviews_by_reviewer(user_id)
            .await?
            .into_iter()
            .map(|r| r.submission_id)
            .collect();

        let submissions = self.store.list_submissions().await?;
        Ok(submissions
            .into_iter()
            .filter(|s| {
                s.status == SubmissionStatus::Pending
                    && s.author_id != user_id
                    && s.reviews_received < s.reviews_required
                    && !reviewed.contains(&s.id)
            })
            .collect())
    }
}
