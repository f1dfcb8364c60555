//! Peerflow Domain Model
//!
//! Defines the record types of the peer-review learning platform:
//! - User: platform member with reviewer points and author experience
//! - Assignment: a posted exercise with a configured review quota
//! - Submission: a piece of work moving Pending -> Completed as reviews land
//! - Review: an immutable peer review with a quality tier and point payout
//! - SyncRequest: a pairwise calendar-sync handshake record
//!
//! Scoring and leveling rules live in [`policy`]; structural input
//! validation lives in [`error`]. Storage and workflow logic are out of
//! this crate - see `peerflow-store` and `peerflow-core`.

pub mod entities;
pub mod error;
pub mod policy;

pub use entities::{
    Assignment, AssignmentId, QualityTier, Review, ReviewId, Submission, SubmissionId,
    SubmissionStatus, SyncDecision, SyncRequest, SyncRequestId, SyncStatus, User, UserId,
};
pub use error::ValidationError;
pub use policy::ScoringPolicy;

/// Peerflow domain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
