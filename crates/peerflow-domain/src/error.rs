//! Input validation taxonomy for the domain.

/// Errors produced by structural validation of caller input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("rating must be between 1 and 5, got {rating}")]
    RatingOutOfRange { rating: u8 },

    #[error("feedback must be at least {min} characters, got {len}")]
    FeedbackTooShort { len: usize, min: usize },

    #[error("difficulty must be between 1 and 5, got {difficulty}")]
    DifficultyOutOfRange { difficulty: u8 },

    #[error("required field must not be empty: {field}")]
    EmptyField { field: &'static str },
}

/// Check that a required text field is non-empty after trimming.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}
