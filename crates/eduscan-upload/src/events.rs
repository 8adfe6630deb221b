//! Working-set change notifications

use crate::item::UploadItem;
use serde::{Deserialize, Serialize};

/// Published on the manager's broadcast channel for every state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    Added { item: UploadItem },
    Progress { id: String, progress: f64 },
    Processing { id: String },
    Completed { id: String, result_text: String },
    Failed { id: String, message: String },
    Removed { id: String },
}
