//! Tracked state of one accepted file

use crate::intake::FileRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Processing,
    Completed,
    /// Only reached when the grading provider fails to produce text
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Uploading => "uploading",
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    pub id: String,
    pub file: FileRef,
    pub status: UploadStatus,
    /// Percent in `[0, 100]`, never decreasing
    pub progress: f64,
    /// Present only once `status` is `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UploadItem {
    pub fn new(file: FileRef) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file,
            status: UploadStatus::Uploading,
            progress: 0.0,
            result_text: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn advance(&mut self, progress: f64) {
        self.progress = self.progress.max(progress.min(100.0));
    }

    pub(crate) fn start_processing(&mut self) {
        self.progress = 100.0;
        self.status = UploadStatus::Processing;
    }

    pub(crate) fn complete(&mut self, result_text: String) {
        self.progress = 100.0;
        self.status = UploadStatus::Completed;
        self.result_text = Some(result_text);
    }

    pub(crate) fn fail(&mut self) {
        self.status = UploadStatus::Error;
    }
}
