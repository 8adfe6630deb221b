//! EduScan Web UI
//!
//! Embedded web interface for the grading assistant: login, answer-sheet
//! upload with live progress, the grading dashboard, feedback composer,
//! analytics and about pages.
//! All HTML templates and custom JS/CSS are compiled into the binary.
//! Third-party libraries (Chart.js) are loaded from CDN.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod readiness;
pub mod server;

pub use error::UiError;
pub use readiness::SessionReadiness;
pub use server::{UiConfig, UiServer, build_router};

use eduscan_core::{
    GradingProvider, feedback::FeedbackBoard, grading::GradingBoard,
};
use eduscan_observability::Metrics;
use eduscan_session::SessionGate;
use eduscan_upload::UploadManager;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for the UI server
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SessionGate>,
    pub uploads: UploadManager,
    pub grading: Arc<RwLock<GradingBoard>>,
    pub feedback: Arc<RwLock<FeedbackBoard>>,
    pub provider: Arc<dyn GradingProvider>,
    pub metrics: Arc<Metrics>,
    pub config: UiConfig,
}

impl AppState {
    /// Seed the grading and feedback boards from the provider
    pub async fn new(
        gate: Arc<SessionGate>,
        uploads: UploadManager,
        provider: Arc<dyn GradingProvider>,
        metrics: Arc<Metrics>,
        config: UiConfig,
    ) -> eduscan_core::Result<Self> {
        let answers = provider.graded_answers().await?;
        let feedbacks = provider.student_feedback().await?;

        Ok(Self {
            gate,
            uploads,
            grading: Arc::new(RwLock::new(GradingBoard::new(answers))),
            feedback: Arc::new(RwLock::new(FeedbackBoard::new(feedbacks))),
            provider,
            metrics,
            config,
        })
    }
}
