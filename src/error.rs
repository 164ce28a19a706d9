//! Error types for the fitness insight engine

use thiserror::Error;

/// Errors that can occur while validating profiles or computing insights
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Profile not found for client: {0}")]
    ProfileNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Profile store error: {0}")]
    Store(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl InsightError {
    /// Whether the failure was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InsightError::InvalidInput(_)
                | InsightError::MissingField(_)
                | InsightError::ProfileNotFound(_)
                | InsightError::Forbidden(_)
                | InsightError::InsufficientData(_)
        )
    }

    /// HTTP status an outer transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            InsightError::InvalidInput(_)
            | InsightError::MissingField(_)
            | InsightError::InsufficientData(_) => 400,
            InsightError::Forbidden(_) => 403,
            InsightError::ProfileNotFound(_) => 404,
            InsightError::InvalidConfig(_) | InsightError::Store(_) | InsightError::Json(_) => 500,
        }
    }
}
