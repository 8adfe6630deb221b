//! Transient user-facing messages (rendered as toasts by the UI)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    /// Destructive notices are rendered as errors
    #[serde(default)]
    pub destructive: bool,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: false,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            destructive: true,
            ..Self::new(title, description)
        }
    }
}
