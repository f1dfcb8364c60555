//! Trait contract tests for the record store.
//!
//! These verify the behavioral contracts of the storage traits using the
//! in-memory implementation. Any conforming backend must pass these; a
//! mirrored module runs the key contracts against `SurrealStore`.

use peerflow_domain::{AssignmentId, QualityTier, SubmissionId, SyncStatus, UserId};
use peerflow_store::{
    AssignmentStore, MemoryStore, NewAssignment, NewReview, NewSubmission, NewSyncRequest,
    NewUser, ReviewStore, StorageError, SubmissionStore, SurrealStore, SyncStore, UserStore,
};

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        bio: None,
    }
}

fn new_assignment(author: UserId, category: &str, difficulty: u8) -> NewAssignment {
    NewAssignment {
        title: "Sample assignment".to_string(),
        description: "Do the thing.".to_string(),
        category: category.to_string(),
        difficulty,
        author_id: author,
        required_reviews: 3,
    }
}

fn new_submission(assignment: AssignmentId, author: UserId) -> NewSubmission {
    NewSubmission {
        assignment_id: assignment,
        author_id: author,
        content: "my solution".to_string(),
        reviews_required: 3,
    }
}

fn new_review(submission: SubmissionId, reviewer: UserId, rating: u8) -> NewReview {
    NewReview {
        submission_id: submission,
        reviewer_id: reviewer,
        rating,
        feedback: "helpful words".to_string(),
        quality: QualityTier::Basic,
        points_awarded: 10,
    }
}

// ===========================================================================
// UserStore contract tests
// ===========================================================================

#[tokio::test]
async fn user_ids_are_a_dense_sequence() {
    let store = MemoryStore::new();
    let a = store.insert_user(new_user("a")).await.unwrap();
    let b = store.insert_user(new_user("b")).await.unwrap();

    assert_eq!(a.id, UserId(1));
    assert_eq!(b.id, UserId(2));
}

#[tokio::test]
async fn fresh_user_starts_at_zero_progression() {
    let store = MemoryStore::new();
    let user = store.insert_user(new_user("fresh")).await.unwrap();

    assert_eq!(user.points, 0);
    assert_eq!(user.total_xp, 0);
    assert_eq!(user.level(), 1);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let store = MemoryStore::new();
    store.insert_user(new_user("dup")).await.unwrap();

    let err = store.insert_user(new_user("dup")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict { .. }));
}

#[tokio::test]
async fn user_get_not_found() {
    let store = MemoryStore::new();
    let err = store.user(UserId(404)).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::NotFound {
            collection: "users",
            id: 404
        }
    ));
}

#[tokio::test]
async fn user_lookup_by_username_is_exact() {
    let store = MemoryStore::new();
    store.insert_user(new_user("exact")).await.unwrap();

    assert!(store.user_by_username("exact").await.unwrap().is_some());
    assert!(store.user_by_username("Exact").await.unwrap().is_none());
}

#[tokio::test]
async fn user_update_roundtrip() {
    let store = MemoryStore::new();
    let mut user = store.insert_user(new_user("mutable")).await.unwrap();

    user.points = 25;
    user.total_xp = 1_200;
    store.update_user(&user).await.unwrap();

    let read_back = store.user(user.id).await.unwrap();
    assert_eq!(read_back.points, 25);
    assert_eq!(read_back.total_xp, 1_200);
}

#[tokio::test]
async fn user_update_unknown_not_found() {
    let store = MemoryStore::new();
    let mut user = store.insert_user(new_user("ghost-base")).await.unwrap();
    user.id = UserId(404);

    let err = store.update_user(&user).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn user_search_is_case_insensitive_substring() {
    let store = MemoryStore::new();
    store.insert_user(new_user("Alice")).await.unwrap();
    store.insert_user(new_user("malice")).await.unwrap();
    store.insert_user(new_user("bob")).await.unwrap();

    let hits = store.search_users("ALIC").await.unwrap();
    assert_eq!(hits.len(), 2);
}

// ===========================================================================
// AssignmentStore contract tests
// ===========================================================================

#[tokio::test]
async fn sequences_are_per_collection() {
    let store = MemoryStore::new();
    let user = store.insert_user(new_user("author")).await.unwrap();
    let assignment = store
        .insert_assignment(new_assignment(user.id, "rust", 2))
        .await
        .unwrap();

    // Both collections start their own sequence at 1.
    assert_eq!(user.id, UserId(1));
    assert_eq!(assignment.id, AssignmentId(1));
}

#[tokio::test]
async fn assignment_filters_by_category_and_difficulty() {
    let store = MemoryStore::new();
    let author = store.insert_user(new_user("author")).await.unwrap();
    store
        .insert_assignment(new_assignment(author.id, "rust", 2))
        .await
        .unwrap();
    store
        .insert_assignment(new_assignment(author.id, "rust", 4))
        .await
        .unwrap();
    store
        .insert_assignment(new_assignment(author.id, "python", 4))
        .await
        .unwrap();

    assert_eq!(store.list_assignments().await.unwrap().len(), 3);
    assert_eq!(store.assignments_by_category("rust").await.unwrap().len(), 2);
    assert_eq!(
        store.assignments_by_difficulty(4).await.unwrap().len(),
        2
    );
    assert!(store
        .assignments_by_category("haskell")
        .await
        .unwrap()
        .is_empty());
}

// ===========================================================================
// SubmissionStore contract tests
// ===========================================================================

#[tokio::test]
async fn submission_starts_pending_with_zero_reviews() {
    let store = MemoryStore::new();
    let submission = store
        .insert_submission(new_submission(AssignmentId(1), UserId(1)))
        .await
        .unwrap();

    assert_eq!(submission.reviews_received, 0);
    assert_eq!(submission.reviews_required, 3);
    assert!(!submission.fully_reviewed());
}

#[tokio::test]
async fn submission_lists_filter_by_assignment_and_author() {
    let store = MemoryStore::new();
    store
        .insert_submission(new_submission(AssignmentId(1), UserId(1)))
        .await
        .unwrap();
    store
        .insert_submission(new_submission(AssignmentId(1), UserId(2)))
        .await
        .unwrap();
    store
        .insert_submission(new_submission(AssignmentId(2), UserId(1)))
        .await
        .unwrap();

    assert_eq!(store.list_submissions().await.unwrap().len(), 3);
    assert_eq!(
        store
            .submissions_by_assignment(AssignmentId(1))
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        store.submissions_by_author(UserId(1)).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn submission_update_roundtrip() {
    let store = MemoryStore::new();
    let mut submission = store
        .insert_submission(new_submission(AssignmentId(1), UserId(1)))
        .await
        .unwrap();

    submission.reviews_received = 3;
    submission.status = peerflow_domain::SubmissionStatus::Completed;
    store.update_submission(&submission).await.unwrap();

    let read_back = store.submission(submission.id).await.unwrap();
    assert_eq!(read_back.reviews_received, 3);
    assert_eq!(
        read_back.status,
        peerflow_domain::SubmissionStatus::Completed
    );
}

// ===========================================================================
// ReviewStore contract tests
// ===========================================================================

#[tokio::test]
async fn reviews_list_by_submission_and_reviewer() {
    let store = MemoryStore::new();
    store
        .insert_review(new_review(SubmissionId(1), UserId(10), 4))
        .await
        .unwrap();
    store
        .insert_review(new_review(SubmissionId(1), UserId(11), 5))
        .await
        .unwrap();
    store
        .insert_review(new_review(SubmissionId(2), UserId(10), 3))
        .await
        .unwrap();

    assert_eq!(
        store
            .reviews_by_submission(SubmissionId(1))
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        store.reviews_by_reviewer(UserId(10)).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn review_fields_survive_storage() {
    let store = MemoryStore::new();
    let review = store
        .insert_review(new_review(SubmissionId(1), UserId(10), 4))
        .await
        .unwrap();

    let read_back = store.review(review.id).await.unwrap();
    assert_eq!(read_back, review);
}

// ===========================================================================
// SyncStore contract tests
// ===========================================================================

fn pair(from: u64, to: u64) -> NewSyncRequest {
    NewSyncRequest {
        from_user_id: UserId(from),
        to_user_id: UserId(to),
    }
}

#[tokio::test]
async fn sync_request_starts_pending() {
    let store = MemoryStore::new();
    let request = store.insert_sync_request(pair(1, 2)).await.unwrap();

    assert_eq!(request.status, SyncStatus::Pending);
    assert!(request.responded_at.is_none());
}

#[tokio::test]
async fn pending_requests_are_scoped_to_the_addressee() {
    let store = MemoryStore::new();
    store.insert_sync_request(pair(1, 2)).await.unwrap();
    store.insert_sync_request(pair(3, 2)).await.unwrap();
    store.insert_sync_request(pair(2, 1)).await.unwrap();

    let incoming = store.pending_sync_requests_for(UserId(2)).await.unwrap();
    assert_eq!(incoming.len(), 2);
    assert!(incoming.iter().all(|r| r.to_user_id == UserId(2)));
}

#[tokio::test]
async fn involving_covers_both_directions() {
    let store = MemoryStore::new();
    store.insert_sync_request(pair(1, 2)).await.unwrap();
    store.insert_sync_request(pair(3, 1)).await.unwrap();
    store.insert_sync_request(pair(2, 3)).await.unwrap();

    let involving = store.sync_requests_involving(UserId(1)).await.unwrap();
    assert_eq!(involving.len(), 2);
}

#[tokio::test]
async fn sync_update_roundtrip() {
    let store = MemoryStore::new();
    let mut request = store.insert_sync_request(pair(1, 2)).await.unwrap();

    request.status = SyncStatus::Accepted;
    request.responded_at = Some(chrono::Utc::now());
    store.update_sync_request(&request).await.unwrap();

    let read_back = store.sync_request(request.id).await.unwrap();
    assert_eq!(read_back.status, SyncStatus::Accepted);
    assert!(read_back.responded_at.is_some());
}

#[tokio::test]
async fn delete_pair_ignores_direction_and_status() {
    let store = MemoryStore::new();
    let mut accepted = store.insert_sync_request(pair(1, 2)).await.unwrap();
    accepted.status = SyncStatus::Accepted;
    store.update_sync_request(&accepted).await.unwrap();
    store.insert_sync_request(pair(2, 1)).await.unwrap();
    store.insert_sync_request(pair(1, 3)).await.unwrap();

    let removed = store.delete_sync_pair(UserId(2), UserId(1)).await.unwrap();
    assert_eq!(removed, 2);

    // The unrelated pair is untouched.
    assert_eq!(
        store.sync_requests_involving(UserId(1)).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn delete_pair_with_no_records_is_a_noop() {
    let store = MemoryStore::new();
    let removed = store.delete_sync_pair(UserId(8), UserId(9)).await.unwrap();
    assert_eq!(removed, 0);
}

// ===========================================================================
// SurrealStore contract tests (mirrors the key contracts above)
// ===========================================================================

mod surreal_store_tests {
    use super::*;

    async fn store() -> SurrealStore {
        SurrealStore::in_memory().await.expect("in_memory() failed")
    }

    #[tokio::test]
    async fn user_ids_are_a_dense_sequence() {
        let store = store().await;
        let a = store.insert_user(new_user("a")).await.unwrap();
        let b = store.insert_user(new_user("b")).await.unwrap();

        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = store().await;
        store.insert_user(new_user("dup")).await.unwrap();

        let err = store.insert_user(new_user("dup")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn user_get_not_found() {
        let store = store().await;
        let err = store.user(UserId(404)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn user_update_roundtrip() {
        let store = store().await;
        let mut user = store.insert_user(new_user("mutable")).await.unwrap();

        user.points = 25;
        user.total_xp = 1_200;
        store.update_user(&user).await.unwrap();

        let read_back = store.user(user.id).await.unwrap();
        assert_eq!(read_back.points, 25);
        assert_eq!(read_back.total_xp, 1_200);
    }

    #[tokio::test]
    async fn user_search_is_case_insensitive_substring() {
        let store = store().await;
        store.insert_user(new_user("Alice")).await.unwrap();
        store.insert_user(new_user("malice")).await.unwrap();
        store.insert_user(new_user("bob")).await.unwrap();

        let hits = store.search_users("ALIC").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn sequences_are_per_collection() {
        let store = store().await;
        let user = store.insert_user(new_user("author")).await.unwrap();
        let assignment = store
            .insert_assignment(new_assignment(user.id, "rust", 2))
            .await
            .unwrap();

        assert_eq!(user.id, UserId(1));
        assert_eq!(assignment.id, AssignmentId(1));
    }

    #[tokio::test]
    async fn assignment_filters_by_category_and_difficulty() {
        let store = store().await;
        let author = store.insert_user(new_user("author")).await.unwrap();
        store
            .insert_assignment(new_assignment(author.id, "rust", 2))
            .await
            .unwrap();
        store
            .insert_assignment(new_assignment(author.id, "rust", 4))
            .await
            .unwrap();
        store
            .insert_assignment(new_assignment(author.id, "python", 4))
            .await
            .unwrap();

        assert_eq!(store.assignments_by_category("rust").await.unwrap().len(), 2);
        assert_eq!(store.assignments_by_difficulty(4).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn submission_update_roundtrip() {
        let store = store().await;
        let mut submission = store
            .insert_submission(new_submission(AssignmentId(1), UserId(1)))
            .await
            .unwrap();

        submission.reviews_received = 3;
        submission.status = peerflow_domain::SubmissionStatus::Completed;
        store.update_submission(&submission).await.unwrap();

        let read_back = store.submission(submission.id).await.unwrap();
        assert_eq!(read_back.reviews_received, 3);
        assert_eq!(
            read_back.status,
            peerflow_domain::SubmissionStatus::Completed
        );
    }

    #[tokio::test]
    async fn reviews_list_by_submission_and_reviewer() {
        let store = store().await;
        store
            .insert_review(new_review(SubmissionId(1), UserId(10), 4))
            .await
            .unwrap();
        store
            .insert_review(new_review(SubmissionId(1), UserId(11), 5))
            .await
            .unwrap();
        store
            .insert_review(new_review(SubmissionId(2), UserId(10), 3))
            .await
            .unwrap();

        assert_eq!(
            store
                .reviews_by_submission(SubmissionId(1))
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            store.reviews_by_reviewer(UserId(10)).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn delete_pair_ignores_direction_and_status() {
        let store = store().await;
        let mut accepted = store.insert_sync_request(pair(1, 2)).await.unwrap();
        accepted.status = SyncStatus::Accepted;
        store.update_sync_request(&accepted).await.unwrap();
        store.insert_sync_request(pair(2, 1)).await.unwrap();
        store.insert_sync_request(pair(1, 3)).await.unwrap();

        let removed = store.delete_sync_pair(UserId(2), UserId(1)).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            store.sync_requests_involving(UserId(1)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn data_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store");
        let path = path.to_str().unwrap();

        {
            let store = SurrealStore::open(path).await.unwrap();
            store.insert_user(new_user("durable")).await.unwrap();
        }

        let store = SurrealStore::open(path).await.unwrap();
        let user = store.user_by_username("durable").await.unwrap();
        assert!(user.is_some());
        assert_eq!(user.unwrap().id, UserId(1));
    }
}
