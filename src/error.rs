use std::error::Error;
use std::fmt::{Display, Formatter};

/// Convenient alias for results returned by the adaptive core.
pub type Result<T> = std::result::Result<T, AdaptError>;

/// Recoverable failures surfaced by the estimator, analyzer and session layers.
///
/// None of these are fatal: the operation that produced one left its state
/// untouched, and the caller decides whether to retry, skip or abort.
#[derive(Debug, Clone, PartialEq)]
pub enum AdaptError {
    /// A response event was missing a required field or carried an unusable value.
    MalformedResponse { question_id: String, reason: String },
    /// Path generation was asked to pick from an empty pool.
    EmptyItemPool,
    /// Audio that cannot be analysed at all (as opposed to silent audio).
    InvalidAudio(String),
}

impl AdaptError {
    pub fn malformed(question_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            question_id: question_id.into(),
            reason: reason.into(),
        }
    }
}

impl Display for AdaptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdaptError::MalformedResponse {
                question_id,
                reason,
            } => write!(f, "malformed response for question '{}': {}", question_id, reason),
            AdaptError::EmptyItemPool => write!(f, "no items available for path generation"),
            AdaptError::InvalidAudio(message) => write!(f, "invalid audio: {}", message),
        }
    }
}

impl Error for AdaptError {}
