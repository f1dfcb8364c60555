//! Repository trait definitions for the five Peerflow collections.
//!
//! Each trait covers one collection with a small get/list/insert/update
//! capability set. Inserts take a `New*` payload and return the stored
//! record with its allocated identifier; identifiers are per-collection
//! `u64` sequences owned by the backend.
//!
//! All traits are async and backend-agnostic. `MemoryStore` and
//! `SurrealStore` both implement every trait; code that needs the whole
//! store takes the [`RecordStore`] supertrait as a trait object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use peerflow_domain::{
    Assignment, AssignmentId, QualityTier, Review, ReviewId, Submission, SubmissionId,
    SyncRequest, SyncRequestId, User, UserId,
};

use crate::error::StorageError;

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Insert payloads
// ---------------------------------------------------------------------------

/// Payload for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub bio: Option<String>,
}

/// Payload for posting an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: u8,
    pub author_id: UserId,
    pub required_reviews: u32,
}

/// Payload for submitting work against an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub assignment_id: AssignmentId,
    pub author_id: UserId,
    pub content: String,
    /// Review quota snapshotted from the assignment by the caller.
    pub reviews_required: u32,
}

/// Payload for recording a review. Quality tier and payout are decided by
/// the scorer before the record ever reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub submission_id: SubmissionId,
    pub reviewer_id: UserId,
    pub rating: u8,
    pub feedback: String,
    pub quality: QualityTier,
    pub points_awarded: u32,
}

/// Payload for opening a sync handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSyncRequest {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
}

// ---------------------------------------------------------------------------
// UserStore
// ---------------------------------------------------------------------------

/// User collection.
///
/// Guarantees:
/// - `insert_user` allocates the next id in the user sequence and rejects
///   a username that is already taken with `StorageError::Conflict`.
/// - Users are never deleted.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new user and return it with its allocated id.
    async fn insert_user(&self, new: NewUser) -> StorageResult<User>;

    /// Fetch a user by id. `StorageError::NotFound` if absent.
    async fn user(&self, id: UserId) -> StorageResult<User>;

    /// Fetch a user by exact username, if any.
    async fn user_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// Replace a user record. `StorageError::NotFound` if the id is unknown.
    async fn update_user(&self, user: &User) -> StorageResult<()>;

    /// Case-insensitive username substring search, unordered.
    async fn search_users(&self, query: &str) -> StorageResult<Vec<User>>;
}

// ---------------------------------------------------------------------------
// AssignmentStore
// ---------------------------------------------------------------------------

/// Assignment collection. Records are immutable after insert.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Store a new assignment and return it with its allocated id.
    async fn insert_assignment(&self, new: NewAssignment) -> StorageResult<Assignment>;

    /// Fetch an assignment by id. `StorageError::NotFound` if absent.
    async fn assignment(&self, id: AssignmentId) -> StorageResult<Assignment>;

    /// All assignments, unordered snapshot.
    async fn list_assignments(&self) -> StorageResult<Vec<Assignment>>;

    /// Assignments matching a category label exactly.
    async fn assignments_by_category(&self, category: &str) -> StorageResult<Vec<Assignment>>;

    /// Assignments at a given difficulty grade.
    async fn assignments_by_difficulty(&self, difficulty: u8) -> StorageResult<Vec<Assignment>>;
}

// ---------------------------------------------------------------------------
// SubmissionStore
// ---------------------------------------------------------------------------

/// Submission collection.
///
/// Guarantees:
/// - Counter and status changes go through `update_submission`; callers
///   are responsible for holding the submission's workflow lock around
///   read-modify-write sequences.
/// - Submissions are never deleted.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Store a new submission and return it with its allocated id.
    async fn insert_submission(&self, new: NewSubmission) -> StorageResult<Submission>;

    /// Fetch a submission by id. `StorageError::NotFound` if absent.
    async fn submission(&self, id: SubmissionId) -> StorageResult<Submission>;

    /// Replace a submission record. `StorageError::NotFound` if unknown.
    async fn update_submission(&self, submission: &Submission) -> StorageResult<()>;

    /// All submissions, unordered snapshot.
    async fn list_submissions(&self) -> StorageResult<Vec<Submission>>;

    /// Submissions against one assignment.
    async fn submissions_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>>;

    /// Submissions authored by one user.
    async fn submissions_by_author(&self, author_id: UserId) -> StorageResult<Vec<Submission>>;
}

// ---------------------------------------------------------------------------
// ReviewStore
// ---------------------------------------------------------------------------

/// Review collection. Records are immutable after insert and never deleted.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Store a new review and return it with its allocated id.
    async fn insert_review(&self, new: NewReview) -> StorageResult<Review>;

    /// Fetch a review by id. `StorageError::NotFound` if absent.
    async fn review(&self, id: ReviewId) -> StorageResult<Review>;

    /// All reviews of one submission, unordered.
    async fn reviews_by_submission(
        &self,
        submission_id: SubmissionId,
    ) -> StorageResult<Vec<Review>>;

    /// All reviews written by one user, unordered.
    async fn reviews_by_reviewer(&self, reviewer_id: UserId) -> StorageResult<Vec<Review>>;
}

// ---------------------------------------------------------------------------
// SyncStore
// ---------------------------------------------------------------------------

/// Sync-request collection.
///
/// Guarantees:
/// - `delete_sync_pair` removes every record connecting the unordered
///   pair, in any status and either direction, and reports how many.
#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Store a new pending request and return it with its allocated id.
    async fn insert_sync_request(&self, new: NewSyncRequest) -> StorageResult<SyncRequest>;

    /// Fetch a request by id. `StorageError::NotFound` if absent.
    async fn sync_request(&self, id: SyncRequestId) -> StorageResult<SyncRequest>;

    /// Replace a request record. `StorageError::NotFound` if unknown.
    async fn update_sync_request(&self, request: &SyncRequest) -> StorageResult<()>;

    /// Pending requests addressed to a user, unordered.
    async fn pending_sync_requests_for(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>>;

    /// Every request with the user on either side, any status, unordered.
    async fn sync_requests_involving(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>>;

    /// Delete all requests for the unordered pair; returns the count.
    async fn delete_sync_pair(&self, a: UserId, b: UserId) -> StorageResult<usize>;
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// The whole store: every collection behind one object-safe trait, for
/// components that orchestrate across collections.
pub trait RecordStore:
    UserStore + AssignmentStore + SubmissionStore + ReviewStore + SyncStore
{
}

impl<T> RecordStore for T where
    T: UserStore + AssignmentStore + SubmissionStore + ReviewStore + SyncStore
{
}
