//! EduScan Upload Simulator
//!
//! Accepts answer-sheet files into an ordered working set and drives each one
//! through a simulated pipeline:
//!
//! ```text
//! uploading (progress ticks 0 -> 100) -> processing (fixed delay) -> completed
//! ```
//!
//! Every item runs in its own task. Removing an item aborts that task, and
//! every update is applied by id lookup so a step that races a removal is a
//! no-op.

pub mod config;
pub mod error;
pub mod events;
pub mod intake;
pub mod item;
pub mod manager;
pub mod pipeline;

pub use config::{PipelineConfig, UploadConfig};
pub use error::{UploadError, UploadResult};
pub use events::UploadEvent;
pub use intake::{FileRef, IntakePolicy, Rejection, RejectionReason};
pub use item::{UploadItem, UploadStatus};
pub use manager::{AcceptOutcome, UploadManager};
pub use pipeline::{FixedIncrements, IncrementSource, RandomIncrements};
