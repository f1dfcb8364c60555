//! Error types for the record store.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record with the given id in the named collection.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: u64 },

    /// A uniqueness constraint was violated.
    #[error("conflict in {collection}: {detail}")]
    Conflict { collection: &'static str, detail: String },

    /// Database connection error.
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// Backend query or I/O error.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Record could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
