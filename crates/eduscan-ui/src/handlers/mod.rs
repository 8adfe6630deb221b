//! HTTP handlers

pub mod about;
pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod feedback;
pub mod not_found;
pub mod static_files;
pub mod upload;

use crate::UiError;
use askama::Template;
use axum::response::Html;
use eduscan_core::Notice;
use eduscan_session::Session;
use serde::Serialize;

/// Render a template, mapping failures to a 500
pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, UiError> {
    Ok(Html(template.render()?))
}

/// Navigation context shared by every signed-in page
pub(crate) struct Layout {
    pub active: &'static str,
    pub user_name: String,
    pub user_role: String,
}

impl Layout {
    pub(crate) fn new(active: &'static str, session: &Session) -> Self {
        Self {
            active,
            user_name: session.display_name.clone(),
            user_role: session.role.clone(),
        }
    }
}

/// Body of a mutating API call: the updated entity plus an optional toast
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub item: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl<T> ActionResponse<T> {
    pub fn new(item: T) -> Self {
        Self { item, notice: None }
    }

    pub fn with_notice(item: T, notice: Notice) -> Self {
        Self {
            item,
            notice: Some(notice),
        }
    }
}
