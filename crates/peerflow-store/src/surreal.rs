//! SurrealDB-backed record store.
//!
//! Uses the row types in [`crate::schema`] for persistence, converting to
//! domain entities at the trait boundary. Identifier sequences live in a
//! `counters` table, one row per collection.

use async_trait::async_trait;
use chrono::Utc;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use peerflow_domain::{
    Assignment, AssignmentId, Review, ReviewId, Submission, SubmissionId, SubmissionStatus,
    SyncRequest, SyncRequestId, SyncStatus, User, UserId,
};

use crate::error::StorageError;
use crate::migrations;
use crate::schema::{AssignmentRow, CounterRow, ReviewRow, SubmissionRow, SyncRequestRow, UserRow};
use crate::storage_traits::*;

/// SurrealDB-backed implementation of [`RecordStore`].
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// Create an ephemeral in-memory instance.
    ///
    /// Connects to `mem://`, selects `peerflow/main`, and runs the schema
    /// setup. Used by tests and throwaway sessions.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    /// Open (or create) a persistent store at the given directory.
    pub async fn open(path: &str) -> StorageResult<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::Connection(format!("failed to create store directory {path}: {e}"))
        })?;
        Self::connect(&format!("surrealkv://{path}")).await
    }

    /// Create from the environment.
    ///
    /// Honours `PEERFLOW_DB` (a SurrealDB connection URL or a local
    /// directory), falling back to `.peerflow/db` in the current
    /// directory.
    pub async fn from_env() -> StorageResult<Self> {
        match std::env::var("PEERFLOW_DB") {
            Ok(value) if value.contains("://") => Self::connect(&value).await,
            Ok(path) => Self::open(&path).await,
            Err(_) => {
                info!("PEERFLOW_DB not set, using local store at .peerflow/db");
                Self::open(".peerflow/db").await
            }
        }
    }

    async fn connect(url: &str) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(format!("failed to connect to {url}: {e}")))?;

        db.use_ns("peerflow")
            .use_db("main")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealStore connected ({url})");
        Ok(Self { db })
    }

    // -- private helpers -----------------------------------------------------

    /// Allocate the next id in a collection's sequence.
    async fn next_id(&self, collection: &'static str) -> StorageResult<u64> {
        let mut res = self
            .db
            .query("UPSERT type::thing('counters', $key) SET value += 1 RETURN AFTER")
            .bind(("key", collection))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<CounterRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(|r| r.value)
            .ok_or_else(|| {
                StorageError::Backend(format!("counter allocation returned no row: {collection}"))
            })
    }

    async fn select_rows<R>(&self, sql: &'static str, id: u64) -> StorageResult<Vec<R>>
    where
        R: serde::de::DeserializeOwned,
    {
        let mut res = self
            .db
            .query(sql)
            .bind(("id", id))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        res.take(0).map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn fetch_user_row(&self, id: UserId) -> StorageResult<UserRow> {
        self.select_rows("SELECT * FROM users WHERE user_id = $id", id.0)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound {
                collection: "users",
                id: id.0,
            })
    }

    async fn fetch_submission_row(&self, id: SubmissionId) -> StorageResult<SubmissionRow> {
        self.select_rows("SELECT * FROM submissions WHERE submission_id = $id", id.0)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound {
                collection: "submissions",
                id: id.0,
            })
    }

    async fn fetch_sync_request_row(&self, id: SyncRequestId) -> StorageResult<SyncRequestRow> {
        self.select_rows(
            "SELECT * FROM sync_requests WHERE request_id = $id",
            id.0,
        )
        .await?
        .into_iter()
        .next()
        .ok_or(StorageError::NotFound {
            collection: "sync_requests",
            id: id.0,
        })
    }
}

#[async_trait]
impl UserStore for SurrealStore {
    async fn insert_user(&self, new: NewUser) -> StorageResult<User> {
        if self.user_by_username(&new.username).await?.is_some() {
            return Err(StorageError::Conflict {
                collection: "users",
                detail: format!("username already taken: {}", new.username),
            });
        }

        let user = User {
            id: UserId(self.next_id("users").await?),
            username: new.username,
            bio: new.bio,
            points: 0,
            total_xp: 0,
            created_at: Utc::now(),
        };

        debug!(user_id = %user.id, username = %user.username, "creating user");

        let _created: Option<UserRow> = self
            .db
            .create("users")
            .content(UserRow::from(&user))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(user)
    }

    async fn user(&self, id: UserId) -> StorageResult<User> {
        self.fetch_user_row(id).await.map(User::from)
    }

    async fn user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let name = username.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM users WHERE username = $name")
            .bind(("name", name))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<UserRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().next().map(User::from))
    }

    async fn update_user(&self, user: &User) -> StorageResult<()> {
        self.fetch_user_row(user.id).await?;

        self.db
            .query("UPDATE users CONTENT $row WHERE user_id = $id")
            .bind(("row", UserRow::from(user)))
            .bind(("id", user.id.0))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn search_users(&self, query: &str) -> StorageResult<Vec<User>> {
        let needle = query.to_lowercase();
        let mut res = self
            .db
            .query("SELECT * FROM users WHERE string::contains(string::lowercase(username), $needle)")
            .bind(("needle", needle))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<UserRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl AssignmentStore for SurrealStore {
    async fn insert_assignment(&self, new: NewAssignment) -> StorageResult<Assignment> {
        let assignment = Assignment {
            id: AssignmentId(self.next_id("assignments").await?),
            title: new.title,
            description: new.description,
            category: new.category,
            difficulty: new.difficulty,
            author_id: new.author_id,
            required_reviews: new.required_reviews,
            created_at: Utc::now(),
        };

        debug!(assignment_id = %assignment.id, "creating assignment");

        let _created: Option<AssignmentRow> = self
            .db
            .create("assignments")
            .content(AssignmentRow::from(&assignment))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(assignment)
    }

    async fn assignment(&self, id: AssignmentId) -> StorageResult<Assignment> {
        let row: AssignmentRow = self
            .select_rows("SELECT * FROM assignments WHERE assignment_id = $id", id.0)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound {
                collection: "assignments",
                id: id.0,
            })?;

        Ok(Assignment::from(row))
    }

    async fn list_assignments(&self) -> StorageResult<Vec<Assignment>> {
        let mut res = self
            .db
            .query("SELECT * FROM assignments")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<AssignmentRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn assignments_by_category(&self, category: &str) -> StorageResult<Vec<Assignment>> {
        let category = category.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM assignments WHERE category = $category")
            .bind(("category", category))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<AssignmentRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn assignments_by_difficulty(&self, difficulty: u8) -> StorageResult<Vec<Assignment>> {
        let mut res = self
            .db
            .query("SELECT * FROM assignments WHERE difficulty = $difficulty")
            .bind(("difficulty", difficulty))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<AssignmentRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(Assignment::from).collect())
    }
}

#[async_trait]
impl SubmissionStore for SurrealStore {
    async fn insert_submission(&self, new: NewSubmission) -> StorageResult<Submission> {
        let submission = Submission {
            id: SubmissionId(self.next_id("submissions").await?),
            assignment_id: new.assignment_id,
            author_id: new.author_id,
            content: new.content,
            status: SubmissionStatus::Pending,
            reviews_received: 0,
            reviews_required: new.reviews_required,
            submitted_at: Utc::now(),
        };

        debug!(submission_id = %submission.id, "creating submission");

        let _created: Option<SubmissionRow> = self
            .db
            .create("submissions")
            .content(SubmissionRow::from(&submission))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(submission)
    }

    async fn submission(&self, id: SubmissionId) -> StorageResult<Submission> {
        let row = self.fetch_submission_row(id).await?;
        Submission::try_from(row)
    }

    async fn update_submission(&self, submission: &Submission) -> StorageResult<()> {
        self.fetch_submission_row(submission.id).await?;

        self.db
            .query("UPDATE submissions CONTENT $row WHERE submission_id = $id")
            .bind(("row", SubmissionRow::from(submission)))
            .bind(("id", submission.id.0))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list_submissions(&self) -> StorageResult<Vec<Submission>> {
        let mut res = self
            .db
            .query("SELECT * FROM submissions")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<SubmissionRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn submissions_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> StorageResult<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = self
            .select_rows(
                "SELECT * FROM submissions WHERE assignment_id = $id",
                assignment_id.0,
            )
            .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn submissions_by_author(&self, author_id: UserId) -> StorageResult<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = self
            .select_rows(
                "SELECT * FROM submissions WHERE author_id = $id",
                author_id.0,
            )
            .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }
}

#[async_trait]
impl ReviewStore for SurrealStore {
    async fn insert_review(&self, new: NewReview) -> StorageResult<Review> {
        let review = Review {
            id: ReviewId(self.next_id("reviews").await?),
            submission_id: new.submission_id,
            reviewer_id: new.reviewer_id,
            rating: new.rating,
            feedback: new.feedback,
            quality: new.quality,
            points_awarded: new.points_awarded,
            created_at: Utc::now(),
        };

        debug!(review_id = %review.id, submission_id = %review.submission_id, "creating review");

        let _created: Option<ReviewRow> = self
            .db
            .create("reviews")
            .content(ReviewRow::from(&review))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(review)
    }

    async fn review(&self, id: ReviewId) -> StorageResult<Review> {
        let row: ReviewRow = self
            .select_rows("SELECT * FROM reviews WHERE review_id = $id", id.0)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound {
                collection: "reviews",
                id: id.0,
            })?;

        Review::try_from(row)
    }

    async fn reviews_by_submission(
        &self,
        submission_id: SubmissionId,
    ) -> StorageResult<Vec<Review>> {
        let rows: Vec<ReviewRow> = self
            .select_rows(
                "SELECT * FROM reviews WHERE submission_id = $id",
                submission_id.0,
            )
            .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn reviews_by_reviewer(&self, reviewer_id: UserId) -> StorageResult<Vec<Review>> {
        let rows: Vec<ReviewRow> = self
            .select_rows(
                "SELECT * FROM reviews WHERE reviewer_id = $id",
                reviewer_id.0,
            )
            .await?;

        rows.into_iter().map(Review::try_from).collect()
    }
}

#[async_trait]
impl SyncStore for SurrealStore {
    async fn insert_sync_request(&self, new: NewSyncRequest) -> StorageResult<SyncRequest> {
        let request = SyncRequest {
            id: SyncRequestId(self.next_id("sync_requests").await?),
            from_user_id: new.from_user_id,
            to_user_id: new.to_user_id,
            status: SyncStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };

        debug!(request_id = %request.id, "creating sync request");

        let _created: Option<SyncRequestRow> = self
            .db
            .create("sync_requests")
            .content(SyncRequestRow::from(&request))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(request)
    }

    async fn sync_request(&self, id: SyncRequestId) -> StorageResult<SyncRequest> {
        let row = self.fetch_sync_request_row(id).await?;
        SyncRequest::try_from(row)
    }

    async fn update_sync_request(&self, request: &SyncRequest) -> StorageResult<()> {
        self.fetch_sync_request_row(request.id).await?;

        self.db
            .query("UPDATE sync_requests CONTENT $row WHERE request_id = $id")
            .bind(("row", SyncRequestRow::from(request)))
            .bind(("id", request.id.0))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn pending_sync_requests_for(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>> {
        let rows: Vec<SyncRequestRow> = self
            .select_rows(
                "SELECT * FROM sync_requests WHERE to_user_id = $id AND status = 'pending'",
                user_id.0,
            )
            .await?;

        rows.into_iter().map(SyncRequest::try_from).collect()
    }

    async fn sync_requests_involving(&self, user_id: UserId) -> StorageResult<Vec<SyncRequest>> {
        let rows: Vec<SyncRequestRow> = self
            .select_rows(
                "SELECT * FROM sync_requests WHERE from_user_id = $id OR to_user_id = $id",
                user_id.0,
            )
            .await?;

        rows.into_iter().map(SyncRequest::try_from).collect()
    }

    async fn delete_sync_pair(&self, a: UserId, b: UserId) -> StorageResult<usize> {
        let mut res = self
            .db
            .query(
                "SELECT * FROM sync_requests WHERE \
                 (from_user_id = $a AND to_user_id = $b) OR \
                 (from_user_id = $b AND to_user_id = $a)",
            )
            .bind(("a", a.0))
            .bind(("b", b.0))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<SyncRequestRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        if !rows.is_empty() {
            self.db
                .query(
                    "DELETE sync_requests WHERE \
                     (from_user_id = $a AND to_user_id = $b) OR \
                     (from_user_id = $b AND to_user_id = $a)",
                )
                .bind(("a", a.0))
                .bind(("b", b.0))
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }

        Ok(rows.len())
    }
}
