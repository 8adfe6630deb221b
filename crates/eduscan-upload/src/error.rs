//! Upload errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid upload: {0}")]
    Invalid(String),
}

pub type UploadResult<T> = Result<T, UploadError>;
