//! Record definitions for the five core collections.
//!
//! Identifiers are per-collection `u64` sequences allocated by the store;
//! the newtypes exist so a submission id can never be passed where a user
//! id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a [`User`].
    UserId
);
record_id!(
    /// Unique identifier for an [`Assignment`].
    AssignmentId
);
record_id!(
    /// Unique identifier for a [`Submission`].
    SubmissionId
);
record_id!(
    /// Unique identifier for a [`Review`].
    ReviewId
);
record_id!(
    /// Unique identifier for a [`SyncRequest`].
    SyncRequestId
);

// ============================================================================
// USER - member with reviewer points and author experience
// ============================================================================

/// A registered platform member.
///
/// Progression is monotonic: `points` (PRP, earned by reviewing) and
/// `total_xp` (earned when an authored submission completes) only ever
/// increase. The level is derived from `total_xp` on demand - it is not a
/// stored field, so it cannot desynchronise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique handle, case-sensitive as stored.
    pub username: String,

    /// Optional profile blurb.
    pub bio: Option<String>,

    /// Reviewer-side currency ("PRP points").
    pub points: u64,

    /// Author-side experience accumulated from completed submissions.
    pub total_xp: u64,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Current level, a pure function of `total_xp`.
    pub fn level(&self) -> u32 {
        policy::level_for_xp(self.total_xp)
    }
}

// ============================================================================
// ASSIGNMENT - posted exercise with a review quota
// ============================================================================

/// A posted exercise. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,

    pub title: String,

    pub description: String,

    /// Free-form topic label used for catalog filtering.
    pub category: String,

    /// Difficulty grade, 1 (introductory) to 5 (expert).
    pub difficulty: u8,

    /// The posting user.
    pub author_id: UserId,

    /// How many peer reviews each submission to this assignment needs
    /// before it completes. Snapshotted onto submissions at creation.
    pub required_reviews: u32,

    pub created_at: DateTime<Utc>,
}

// ============================================================================
// SUBMISSION - work moving Pending -> Completed
// ============================================================================

/// Lifecycle state of a submission. Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Work submitted against an assignment.
///
/// `reviews_required` is a snapshot of the assignment's quota taken at
/// creation; later assignment edits (there are none today) would not
/// retroactively change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,

    pub assignment_id: AssignmentId,

    /// The submitting user.
    pub author_id: UserId,

    pub content: String,

    pub status: SubmissionStatus,

    /// Count of reviews recorded so far.
    pub reviews_received: u32,

    /// Quota snapshotted from the assignment at creation.
    pub reviews_required: u32,

    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Whether the submission has met its review quota.
    pub fn fully_reviewed(&self) -> bool {
        self.reviews_received >= self.reviews_required
    }
}

// ============================================================================
// REVIEW - immutable peer review
// ============================================================================

/// Payout classification of a review, decided once at creation from the
/// feedback length alone. The rating does not influence the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Basic,
    Quality,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Basic => write!(f, "basic"),
            QualityTier::Quality => write!(f, "quality"),
        }
    }
}

/// A peer review of a submission. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,

    pub submission_id: SubmissionId,

    pub reviewer_id: UserId,

    /// 1-5 star rating of the submission.
    pub rating: u8,

    pub feedback: String,

    pub quality: QualityTier,

    /// PRP points paid to the reviewer, fixed at creation.
    pub points_awarded: u32,

    pub created_at: DateTime<Utc>,
}

// ============================================================================
// SYNC REQUEST - pairwise calendar-sync handshake
// ============================================================================

/// Handshake state. Pending -> Accepted | Rejected, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "pending"),
            SyncStatus::Accepted => write!(f, "accepted"),
            SyncStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// The addressee's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDecision {
    Accept,
    Reject,
}

impl SyncDecision {
    /// The terminal status this decision resolves to.
    pub fn resolved_status(self) -> SyncStatus {
        match self {
            SyncDecision::Accept => SyncStatus::Accepted,
            SyncDecision::Reject => SyncStatus::Rejected,
        }
    }
}

/// A calendar-sync handshake between two users.
///
/// Created Pending by `from_user_id`; resolved exactly once by
/// `to_user_id`. An Accepted record makes the pair "synced peers" in both
/// directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub id: SyncRequestId,

    pub from_user_id: UserId,

    pub to_user_id: UserId,

    pub status: SyncStatus,

    pub created_at: DateTime<Utc>,

    /// Set when the addressee resolves the request.
    pub responded_at: Option<DateTime<Utc>>,
}

impl SyncRequest {
    /// The other side of the pair, from `user`'s point of view.
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if self.from_user_id == user {
            Some(self.to_user_id)
        } else if self.to_user_id == user {
            Some(self.from_user_id)
        } else {
            None
        }
    }

    /// Whether this record connects the unordered pair `(a, b)`.
    pub fn involves_pair(&self, a: UserId, b: UserId) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }
}
