//! File intake checks (type allow-list and size cap)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// What the simulator knows about a dropped file. Contents are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size_bytes: u64, content_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            content_type,
        }
    }

    /// Lowercased extension with a leading dot, e.g. `.pdf`
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    UnsupportedType,
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnsupportedType => write!(f, "unsupported file type"),
            RejectionReason::TooLarge {
                size_bytes,
                max_bytes,
            } => write!(
                f,
                "file is {} bytes, limit is {} bytes",
                size_bytes, max_bytes
            ),
        }
    }
}

/// A file the intake refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

/// Which files may enter the working set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakePolicy {
    /// Accepted extensions, with leading dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Accepted MIME types
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,

    /// Largest accepted file (default: 10 MiB)
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
}

fn default_allowed_extensions() -> Vec<String> {
    [".pdf", ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "application/pdf",
        "image/png",
        "image/jpeg",
        "image/gif",
        "image/bmp",
        "image/tiff",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_size_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            allowed_mime_types: default_allowed_mime_types(),
            max_file_size_bytes: default_max_file_size_bytes(),
        }
    }
}

impl IntakePolicy {
    /// A file passes when its extension or its MIME type is allowed and it
    /// is no larger than the cap.
    pub fn check(&self, file: &FileRef) -> Result<(), RejectionReason> {
        if !self.is_allowed_type(file) {
            return Err(RejectionReason::UnsupportedType);
        }

        if file.size_bytes > self.max_file_size_bytes {
            return Err(RejectionReason::TooLarge {
                size_bytes: file.size_bytes,
                max_bytes: self.max_file_size_bytes,
            });
        }

        Ok(())
    }

    fn is_allowed_type(&self, file: &FileRef) -> bool {
        let extension_ok = file.extension().is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        });

        let mime_ok = file.content_type.as_deref().is_some_and(|ct| {
            // Drop parameters such as "; charset=binary"
            let essence = ct.split(';').next().unwrap_or(ct).trim();
            self.allowed_mime_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(essence))
        });

        extension_ok || mime_ok
    }
}
