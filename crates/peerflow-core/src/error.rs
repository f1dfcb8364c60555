//! Workflow engine error taxonomy.
//!
//! Four recoverable families cross the boundary: `NotFound` (unknown id,
//! or an id the caller may not act on - deliberately indistinguishable
//! for sync responses), `Validation` (malformed input), domain-rule
//! violations, and `Unauthenticated`. None are retried; every operation
//! either completes or fails with one of these.

use peerflow_domain::{SubmissionId, SyncRequestId, SyncStatus, ValidationError};
use peerflow_store::StorageError;

/// Errors produced by the workflow engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: u64 },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("submission already has enough reviews: {submission_id}")]
    AlreadyFullyReviewed { submission_id: SubmissionId },

    #[error("sync request {request_id} already resolved: {current}")]
    InvalidSyncTransition {
        request_id: SyncRequestId,
        current: SyncStatus,
    },

    #[error("username already taken: {username}")]
    UsernameTaken { username: String },

    #[error("no caller identity")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { collection, id } => EngineError::NotFound { collection, id },
            other => EngineError::Storage(other.to_string()),
        }
    }
}

/// Result type for workflow engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_stays_typed() {
        let err: EngineError = StorageError::NotFound {
            collection: "submissions",
            id: 7,
        }
        .into();
        assert!(matches!(
            err,
            EngineError::NotFound {
                collection: "submissions",
                id: 7
            }
        ));
    }

    #[test]
    fn other_storage_errors_degrade_to_strings() {
        let err: EngineError = StorageError::Backend("boom".to_string()).into();
        match err {
            EngineError::Storage(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
