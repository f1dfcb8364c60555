//! Row definitions for the SurrealDB tables.
//!
//! Rows mirror the domain entities but keep status enums as strings and
//! carry their own `*_id` field (SurrealDB owns the record-level `id`).
//! Conversion back to domain types happens at the trait boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use peerflow_domain::{
    Assignment, AssignmentId, QualityTier, Review, ReviewId, Submission, SubmissionId,
    SubmissionStatus, SyncRequest, SyncRequestId, SyncStatus, User, UserId,
};

use crate::error::StorageError;

/// Module for serializing chrono DateTime to SurrealDB datetime format
pub(crate) mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Module for serializing optional chrono DateTime to SurrealDB datetime format
pub(crate) mod surreal_datetime_opt {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => {
                let sd = SurrealDatetime::from(*d);
                serde::Serialize::serialize(&Some(sd), serializer)
            }
            None => serde::Serialize::serialize(&None::<SurrealDatetime>, serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = Option::<SurrealDatetime>::deserialize(deserializer)?;
        Ok(sd.map(DateTime::from))
    }
}

/// Row in the per-collection `counters` table.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CounterRow {
    pub value: u64,
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserRow {
    pub user_id: u64,
    pub username: String,
    pub bio: Option<String>,
    pub points: u64,
    pub total_xp: u64,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        UserRow {
            user_id: user.id.0,
            username: user.username.clone(),
            bio: user.bio.clone(),
            points: user.points,
            total_xp: user.total_xp,
            created_at: user.created_at,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.user_id),
            username: row.username,
            bio: row.bio,
            points: row.points,
            total_xp: row.total_xp,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AssignmentRow {
    pub assignment_id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: u8,
    pub author_id: u64,
    pub required_reviews: u32,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<&Assignment> for AssignmentRow {
    fn from(assignment: &Assignment) -> Self {
        AssignmentRow {
            assignment_id: assignment.id.0,
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            category: assignment.category.clone(),
            difficulty: assignment.difficulty,
            author_id: assignment.author_id.0,
            required_reviews: assignment.required_reviews,
            created_at: assignment.created_at,
        }
    }
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Assignment {
            id: AssignmentId(row.assignment_id),
            title: row.title,
            description: row.description,
            category: row.category,
            difficulty: row.difficulty,
            author_id: UserId(row.author_id),
            required_reviews: row.required_reviews,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubmissionRow {
    pub submission_id: u64,
    pub assignment_id: u64,
    pub author_id: u64,
    pub content: String,
    pub status: String,
    pub reviews_received: u32,
    pub reviews_required: u32,
    #[serde(with = "surreal_datetime")]
    pub submitted_at: DateTime<Utc>,
}

impl From<&Submission> for SubmissionRow {
    fn from(submission: &Submission) -> Self {
        SubmissionRow {
            submission_id: submission.id.0,
            assignment_id: submission.assignment_id.0,
            author_id: submission.author_id.0,
            content: submission.content.clone(),
            status: submission.status.to_string(),
            reviews_received: submission.reviews_received,
            reviews_required: submission.reviews_required,
            submitted_at: submission.submitted_at,
        }
    }
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = StorageError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "pending" => SubmissionStatus::Pending,
            "completed" => SubmissionStatus::Completed,
            other => {
                return Err(StorageError::Backend(format!(
                    "unknown submission status: {other}"
                )))
            }
        };
        Ok(Submission {
            id: SubmissionId(row.submission_id),
            assignment_id: AssignmentId(row.assignment_id),
            author_id: UserId(row.author_id),
            content: row.content,
            status,
            reviews_received: row.reviews_received,
            reviews_required: row.reviews_required,
            submitted_at: row.submitted_at,
        })
    }
}

// ---------------------------------------------------------------------------
// reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ReviewRow {
    pub review_id: u64,
    pub submission_id: u64,
    pub reviewer_id: u64,
    pub rating: u8,
    pub feedback: String,
    pub quality: String,
    pub points_awarded: u32,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        ReviewRow {
            review_id: review.id.0,
            submission_id: review.submission_id.0,
            reviewer_id: review.reviewer_id.0,
            rating: review.rating,
            feedback: review.feedback.clone(),
            quality: review.quality.to_string(),
            points_awarded: review.points_awarded,
            created_at: review.created_at,
        }
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = StorageError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let quality = match row.quality.as_str() {
            "basic" => QualityTier::Basic,
            "quality" => QualityTier::Quality,
            other => {
                return Err(StorageError::Backend(format!(
                    "unknown review quality tier: {other}"
                )))
            }
        };
        Ok(Review {
            id: ReviewId(row.review_id),
            submission_id: SubmissionId(row.submission_id),
            reviewer_id: UserId(row.reviewer_id),
            rating: row.rating,
            feedback: row.feedback,
            quality,
            points_awarded: row.points_awarded,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// sync_requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SyncRequestRow {
    pub request_id: u64,
    pub from_user_id: u64,
    pub to_user_id: u64,
    pub status: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "surreal_datetime_opt")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<&SyncRequest> for SyncRequestRow {
    fn from(request: &SyncRequest) -> Self {
        SyncRequestRow {
            request_id: request.id.0,
            from_user_id: request.from_user_id.0,
            to_user_id: request.to_user_id.0,
            status: request.status.to_string(),
            created_at: request.created_at,
            responded_at: request.responded_at,
        }
    }
}

impl TryFrom<SyncRequestRow> for SyncRequest {
    type Error = StorageError;

    fn try_from(row: SyncRequestRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "pending" => SyncStatus::Pending,
            "accepted" => SyncStatus::Accepted,
            "rejected" => SyncStatus::Rejected,
            other => {
                return Err(StorageError::Backend(format!(
                    "unknown sync request status: {other}"
                )))
            }
        };
        Ok(SyncRequest {
            id: SyncRequestId(row.request_id),
            from_user_id: UserId(row.from_user_id),
            to_user_id: UserId(row.to_user_id),
            status,
            created_at: row.created_at,
            responded_at: row.responded_at,
        })
    }
}
