//! EduScan Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout EduScan:
//! - Grading board (AI scores with teacher overrides)
//! - Feedback composer drafts
//! - Analytics report types
//! - The `GradingProvider` data-source trait and its mock implementation
//! - Core error types

pub mod analytics;
pub mod error;
pub mod feedback;
pub mod grading;
pub mod mock;
pub mod notice;
pub mod provider;

pub use error::{Error, Result};
pub use mock::MockGradingProvider;
pub use notice::Notice;
pub use provider::GradingProvider;
