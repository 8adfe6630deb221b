//! UI error type and its HTTP mapping

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("session restoration in progress")]
    Restoring,

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error("{0}")]
    Internal(String),
}

impl UiError {
    pub fn status(&self) -> StatusCode {
        match self {
            UiError::NotFound(_) => StatusCode::NOT_FOUND,
            UiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            UiError::Unauthorized => StatusCode::UNAUTHORIZED,
            UiError::Restoring => StatusCode::SERVICE_UNAVAILABLE,
            UiError::Render(_) | UiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<eduscan_core::Error> for UiError {
    fn from(e: eduscan_core::Error) -> Self {
        if e.is_not_found() {
            UiError::NotFound(e.to_string())
        } else {
            UiError::Internal(e.to_string())
        }
    }
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !matches!(self, UiError::Restoring) {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.to_string() }));
        match self {
            UiError::Restoring => (status, [(header::RETRY_AFTER, "1")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
