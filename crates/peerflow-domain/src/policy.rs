//! Scoring and leveling rules.
//!
//! The numbers here drive the whole progression economy: review payouts,
//! completion experience, and the level curve. They are collected in
//! [`ScoringPolicy`] so a deployment can tune them without touching the
//! workflow code.

use serde::{Deserialize, Serialize};

use crate::entities::QualityTier;
use crate::error::ValidationError;

/// Experience needed per level step.
pub const XP_PER_LEVEL: u64 = 1_000;

/// Level derived from accumulated experience: `total_xp / 1000 + 1`.
///
/// Level 1 at 0 XP, level 2 at 1000, and so on. Monotonic and total - every
/// XP value maps to exactly one level.
pub fn level_for_xp(total_xp: u64) -> u32 {
    (total_xp / XP_PER_LEVEL) as u32 + 1
}

/// Tunable scoring rules for reviews and completion experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Feedback length (chars) at which a review counts as Quality tier.
    pub quality_feedback_len: usize,

    /// PRP payout for a Quality-tier review.
    pub quality_points: u32,

    /// PRP payout for a Basic-tier review.
    pub basic_points: u32,

    /// Minimum acceptable feedback length (chars).
    pub min_feedback_len: usize,

    /// Experience multiplier applied to the mean rating when a submission
    /// completes: `xp = floor(mean_rating * xp_per_rating_point)`.
    pub xp_per_rating_point: u32,

    /// Review quota for assignments created without an explicit count.
    pub default_required_reviews: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy {
            quality_feedback_len: 100,
            quality_points: 15,
            basic_points: 10,
            min_feedback_len: 10,
            xp_per_rating_point: 20,
            default_required_reviews: 3,
        }
    }
}

impl ScoringPolicy {
    /// Classify a review by feedback length alone.
    pub fn classify(&self, feedback: &str) -> QualityTier {
        if feedback.chars().count() >= self.quality_feedback_len {
            QualityTier::Quality
        } else {
            QualityTier::Basic
        }
    }

    /// PRP payout for a tier.
    pub fn points_for(&self, tier: QualityTier) -> u32 {
        match tier {
            QualityTier::Quality => self.quality_points,
            QualityTier::Basic => self.basic_points,
        }
    }

    /// Experience awarded to the author when a submission completes with
    /// the given ratings: `floor(mean * xp_per_rating_point)`, computed in
    /// integer arithmetic as `multiplier * sum / n`.
    ///
    /// Returns 0 for an empty slice (a submission cannot complete without
    /// reviews, but the function stays total).
    pub fn completion_xp(&self, ratings: &[u8]) -> u64 {
        if ratings.is_empty() {
            return 0;
        }
        let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
        u64::from(self.xp_per_rating_point) * sum / ratings.len() as u64
    }

    /// Validate a rating and feedback pair for a new review.
    pub fn validate_review(&self, rating: u8, feedback: &str) -> Result<(), ValidationError> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange { rating });
        }
        let len = feedback.chars().count();
        if len < self.min_feedback_len {
            return Err(ValidationError::FeedbackTooShort {
                len,
                min: self.min_feedback_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(999), 1);
        assert_eq!(level_for_xp(1_000), 2);
        assert_eq!(level_for_xp(1_001), 2);
        assert_eq!(level_for_xp(2_500), 3);
    }

    #[test]
    fn classify_at_threshold() {
        let policy = ScoringPolicy::default();
        let short = "x".repeat(99);
        let exact = "x".repeat(100);
        assert_eq!(policy.classify(&short), QualityTier::Basic);
        assert_eq!(policy.classify(&exact), QualityTier::Quality);
    }

    #[test]
    fn points_track_tier() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.points_for(QualityTier::Basic), 10);
        assert_eq!(policy.points_for(QualityTier::Quality), 15);
    }

    #[test]
    fn completion_xp_is_floor_of_mean_times_twenty() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.completion_xp(&[4, 5, 3]), 80); // mean 4.0
        assert_eq!(policy.completion_xp(&[1]), 20); // mean 1.0
        assert_eq!(policy.completion_xp(&[5, 4]), 90); // mean 4.5
        assert_eq!(policy.completion_xp(&[5, 5, 5]), 100); // mean 5.0
        assert_eq!(policy.completion_xp(&[2, 2, 3]), 46); // mean 2.33..
        assert_eq!(policy.completion_xp(&[]), 0);
    }

    #[test]
    fn validate_review_rejects_bad_ratings() {
        let policy = ScoringPolicy::default();
        assert!(matches!(
            policy.validate_review(0, "long enough feedback"),
            Err(ValidationError::RatingOutOfRange { rating: 0 })
        ));
        assert!(matches!(
            policy.validate_review(6, "long enough feedback"),
            Err(ValidationError::RatingOutOfRange { rating: 6 })
        ));
        assert!(policy.validate_review(1, "long enough feedback").is_ok());
        assert!(policy.validate_review(5, "long enough feedback").is_ok());
    }

    #[test]
    fn validate_review_rejects_short_feedback() {
        let policy = ScoringPolicy::default();
        assert!(matches!(
            policy.validate_review(3, "too short"),
            Err(ValidationError::FeedbackTooShort { len: 9, min: 10 })
        ));
        assert!(policy.validate_review(3, "just right").is_ok());
    }
}
