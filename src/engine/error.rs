use thiserror::Error;

use crate::money::MoneyError;

/// Failure taxonomy for lifecycle operations.
///
/// Every variant is a terminal outcome of the single attempted operation;
/// nothing is retried internally. The gateway maps each kind to a distinct
/// HTTP status.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    StateConflict(String),

    /// Lost a compare-and-swap race on pick/verify: another actor moved the
    /// request first.
    #[error("Request was updated concurrently, please retry")]
    ConcurrencyConflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MoneyError> for EngineError {
    fn from(err: MoneyError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl EngineError {
    /// True for the conflict family (wrong state or lost race).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::StateConflict(_) | EngineError::ConcurrencyConflict
        )
    }
}
