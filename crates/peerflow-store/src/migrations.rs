//! SurrealDB schema setup for the Peerflow collections.
//!
//! Called once per connection; every statement is idempotent, so repeated
//! initialization is safe.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::StorageResult;

/// Initialize all Peerflow tables.
pub(crate) async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("initializing Peerflow store schema");

    init_users_table(db).await?;
    init_assignments_table(db).await?;
    init_submissions_table(db).await?;
    init_reviews_table(db).await?;
    init_sync_requests_table(db).await?;
    init_counters_table(db).await?;

    info!("Peerflow store schema ready");
    Ok(())
}

async fn run(db: &Surreal<Any>, sql: &str) -> StorageResult<()> {
    db.query(sql)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
    Ok(())
}

/// `users` table. `user_id` and `username` are both unique; users are
/// never deleted.
async fn init_users_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing users table");

    let sql = r#"
        DEFINE TABLE users
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX idx_user_id ON TABLE users COLUMNS user_id UNIQUE;
        DEFINE INDEX idx_username ON TABLE users COLUMNS username UNIQUE;
    "#;

    run(db, sql).await
}

/// `assignments` table. Immutable after creation.
async fn init_assignments_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing assignments table");

    let sql = r#"
        DEFINE TABLE assignments
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX idx_assignment_id ON TABLE assignments COLUMNS assignment_id UNIQUE;
        DEFINE INDEX idx_assignment_category ON TABLE assignments COLUMNS category;
        DEFINE INDEX idx_assignment_difficulty ON TABLE assignments COLUMNS difficulty;
        DEFINE INDEX idx_assignment_author ON TABLE assignments COLUMNS author_id;
    "#;

    run(db, sql).await
}

/// `submissions` table. Status/counter updates happen through the engine;
/// records are never deleted.
async fn init_submissions_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing submissions table");

    let sql = r#"
        DEFINE TABLE submissions
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX idx_submission_id ON TABLE submissions COLUMNS submission_id UNIQUE;
        DEFINE INDEX idx_submission_assignment ON TABLE submissions COLUMNS assignment_id;
        DEFINE INDEX idx_submission_author ON TABLE submissions COLUMNS author_id;
        DEFINE INDEX idx_submission_status ON TABLE submissions COLUMNS status;
    "#;

    run(db, sql).await
}

/// `reviews` table. Append-only.
async fn init_reviews_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing reviews table");

    let sql = r#"
        DEFINE TABLE reviews
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX idx_review_id ON TABLE reviews COLUMNS review_id UNIQUE;
        DEFINE INDEX idx_review_submission ON TABLE reviews COLUMNS submission_id;
        DEFINE INDEX idx_review_reviewer ON TABLE reviews COLUMNS reviewer_id;
    "#;

    run(db, sql).await
}

/// `sync_requests` table. The only collection with deletes (`remove`
/// wipes the unordered pair).
async fn init_sync_requests_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing sync_requests table");

    let sql = r#"
        DEFINE TABLE sync_requests
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        DEFINE INDEX idx_sync_request_id ON TABLE sync_requests COLUMNS request_id UNIQUE;
        DEFINE INDEX idx_sync_from ON TABLE sync_requests COLUMNS from_user_id;
        DEFINE INDEX idx_sync_to ON TABLE sync_requests COLUMNS to_user_id;
        DEFINE INDEX idx_sync_status ON TABLE sync_requests COLUMNS status;
    "#;

    run(db, sql).await
}

/// `counters` table backing the per-collection id sequences.
async fn init_counters_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("initializing counters table");

    let sql = r#"
        DEFINE TABLE counters
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;
    "#;

    run(db, sql).await
}
