//! Grading data-source trait
//!
//! Views and pipelines only talk to a `GradingProvider`, so a real grading
//! backend can replace the mock without touching either.

use crate::{
    Result,
    analytics::AnalyticsReport,
    feedback::StudentFeedback,
    grading::GradedAnswer,
};

#[async_trait::async_trait]
pub trait GradingProvider: Send + Sync {
    /// AI-graded answers for the dashboard
    async fn graded_answers(&self) -> Result<Vec<GradedAnswer>>;

    /// Feedback drafts for the composer
    async fn student_feedback(&self) -> Result<Vec<StudentFeedback>>;

    /// Class-level analytics
    async fn analytics(&self) -> Result<AnalyticsReport>;

    /// One additional AI feedback suggestion
    async fn feedback_suggestion(&self) -> Result<String>;

    /// Recognized text for an uploaded answer sheet
    async fn extract_text(&self, file_name: &str) -> Result<String>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
