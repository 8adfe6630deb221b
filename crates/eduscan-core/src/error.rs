//! Error types for EduScan Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Graded answer not found: {0}")]
    AnswerNotFound(String),

    #[error("Feedback not found: {0}")]
    FeedbackNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Whether the error refers to a record that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AnswerNotFound(_) | Error::FeedbackNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
