//! In-memory record store.
//!
//! Mutex-guarded maps with atomic per-collection id sequences. Lock scopes
//! are short and never held across an await, so `std::sync::Mutex` is
//! sufficient. This is the reference implementation of the storage traits
//! and the backend the contract tests run against first.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use peerflow_domain::{
    Assignment, AssignmentId, Review, ReviewId, Submission, SubmissionId, SubmissionStatus,
    SyncRequest, SyncRequestId, SyncStatus, User, UserId,
};

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory implementation of every Peerflow collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<u64, User>>,
    assignments: Mutex<HashMap<u64, Assignment>>,
    submissions: Mutex<HashMap<u64, Submission>>,
    reviews: Mutex<HashMap<u64, Review>>,
    sync_requests: Mutex<HashMap<u64, SyncRequest>>,

    user_seq: AtomicU64,
    assignment_seq: AtomicU64,
    submission_seq: AtomicU64,
    review_seq: AtomicU64,
    sync_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next(seq: &AtomicU64) -> u64 {
    seq.fetch_add(1, Ordering::Relaxed) + 1
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> StorageResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == new.username) {
            return Err(StorageError::Conflict {
                collection: "users",
                detail: format!("username already taken: {}", new.username),
            });
        }
        let user = User {
            id: UserId(next(&self.user_seq)),
            username: new.username,
            bio: new.bio,
            points: 0,
            total_xp: 0,
            created_at: Utc::now(),
        };
        users.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> StorageResult<User> {
        let users = self.users.lock().unwrap();
        users.get(&id.0).cloned().ok_or(StorageError::NotFound {
            collection: "users",
            id: id.0,
        })
    }

    async fn user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user: &User) -> StorageResult<()> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user.id.0) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                collection: "users",
                id: user.id.0,
            }),
        }
    }

    async fn search_users(&self, query: &str) -> StorageResult<Vec<User>> {
        let needle = query.to_lowercase();
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn insert_assignment(&self, new: NewAssignment) -> StorageResult<Assignment> {
        let assignment = Assignment {
            id: AssignmentId(next(&self.assignment_seq)),
            title: new.title,
            description: new.description,
            category: new.category,
            difficulty: new.difficulty,
            author_id: new.author_id,
            required_reviews: new.required_reviews,
            created_at: Utc::now(),
        };
        let mut assignments = self.assignments.lock().unwrap();
        assignments.insert(assignment.id.0, assignment.clone());
        Ok(assignment)
    }

    async fn assignment(&self, id: AssignmentId) -> StorageResult<Assignment> {
        let assignments = self.assignments.lock().unwrap();
        assignments
            .get(&id.0)
            .cloned()
            .ok_or(StorageError::NotFound {
                collection: "assignments",
                id: id.0,
            })
    }

    async fn list_assignments(&self) -> StorageResult<Vec<Assignment>> {
        let assignments = self.assignments.lock().unwrap();
        Ok(assignments.values().cloned().collect())
    }

    async fn assignments_by_category(&self, category: &str) -> StorageResult<Vec<Assignment>> {
        let assignments = self.assignments.lock().unwrap();
        Ok(assignments
            .values()
            .filter(|a| a.category == category)
            .cloned()
            .collect())
    }

    async fn assignments_by_difficulty(&self, difficulty: u8) -> StorageResult<Vec<Assignment>> {
        let assignments = self.assignments.lock().unwrap();
        Ok(assignments
            .values()
            .filter(|a| a.difficulty == difficulty)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_submission(&self, new: NewSubmission) -> StorageResult<Submission> {
        let submission = Submission {
            id: SubmissionId(next(&self.submission_seq)),
            assignment_id: new.assignment_id,
            author_id: new.author_id,
            content: new.content,
            status: SubmissionStatus::Pending,
            reviews_received: 0,
            reviews_required: new.reviews_required,
            submitted_at: Utc::now(),
        };
        let mut submissions = self.submissions.lock().unwrap();
        submissions.insert(submission.id.0, submission.clone());
        Ok(submission)
    }

    async fn submission(&self, id: SubmissionId) -> StorageResult<Submission> {
        let submissions = self.submissions.lock().unwrap();
        submissions
            .get(&id.0)
            .cloned()
            .ok_or(StorageError::NotFound {
                collection: "submissions",
                id: id.0,
            })
    }

    async fn update_submission(&self, submission: &Submission) -> StorageResult<()> {
        let mut submissions = self.submissions.lock().unwrap();
        match submissions.get_mut(&submission.id.0) {
            Some(slot) => {
                *slot = submission.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                collection: "submissions",
                id: submission.id.0,
            }),
        }
    }

    async fn list_submissions(&self) -> StorageResult<Vec<Submission>> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions.values().cloned().collect())
    }

    async fn submissions_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn submissions_by_author(&self, author_id: UserId) -> StorageResult<Vec<Submission>> {
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .values()
            .filter(|s| s.author_id == author_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert_review(&self, new: NewReview) -> StorageResult<Review> {
        let review = Review {
            id: ReviewId(next(&self.review_seq)),
            submission_id: new.submission_id,
            reviewer_id: new.reviewer_id,
            rating: new.rating,
            feedback: new.feedback,
            quality: new.quality,
            points_awarded: new.points_awarded,
            created_at: Utc::now(),
        };
        let mut reviews = self.reviews.lock().unwrap();
        reviews.insert(review.id.0, review.clone());
        Ok(review)
    }

    async fn review(&self, id: ReviewId) -> StorageResult<Review> {
        let reviews = self.reviews.lock().unwrap();
        reviews.get(&id.0).cloned().ok_or(StorageError::NotFound {
            collection: "reviews",
            id: id.0,
        })
    }

    async fn reviews_by_submission(
        &self,
        submission_id: SubmissionId,
    ) -> StorageResult<Vec<Review>> {
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews
            .values()
            .filter(|r| r.submission_id == submission_id)
            .cloned()
            .collect())
    }

    async fn reviews_by_reviewer(&self, reviewer_id: UserId) -> StorageResult<Vec<Review>> {
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews
            .values()
            .filter(|r| r.reviewer_id == reviewer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SyncStore for MemoryStore {
    async fn insert_sync_request(&self, new: NewSyncRequest) -> StorageResult<SyncRequest> {
        let request = SyncRequest {
            id: SyncRequestId(next(&self.sync_seq)),
            from_user_id: new.from_user_id,
            to_user_id: new.to_user_id,
            status: SyncStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };
        let mut requests = self.sync_requests.lock().unwrap();
        requests.insert(request.id.0, request.clone());
        Ok(request)
    }

    async fn sync_request(&self, id: SyncRequestId) -> StorageResult<SyncRequest> {
        let requests = self.sync_requests.lock().unwrap();
        requests.get(&id.0).cloned().ok_or(StorageError::NotFound {
            collection: "sync_requests",
            id: id.0,
        })
    }

    async fn update_sync_request(&self, request: &SyncRequest) -> StorageResult<()> {
        let mut requests = self.sync_requests.lock().unwrap();
        match requests.get_mut(&request.id.0) {
            Some(slot) => {
                *slot = request.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                collection: "sync_requests",
                id: request.id.0,
            }),
        }
    }

    async fn pending_sync_requests_for(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>> {
        let requests = self.sync_requests.lock().unwrap();
        Ok(requests
            .values()
            .filter(|r| r.to_user_id == user_id && r.status == SyncStatus::Pending)
            .cloned()
            .collect())
    }

    async fn sync_requests_involving(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>> {
        let requests = self.sync_requests.lock().unwrap();
        Ok(requests
            .values()
            .filter(|r| r.from_user_id == user_id || r.to_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_sync_pair(&self, a: UserId, b: UserId) -> StorageResult<usize> {
        let mut requests = self.sync_requests.lock().unwrap();
        let before = requests.len();
        requests.retain(|_, r| !r.involves_pair(a, b));
        Ok(before - requests.len())
    }
}
