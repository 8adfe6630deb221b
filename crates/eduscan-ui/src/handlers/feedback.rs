//! Feedback composer page and API

use crate::handlers::{ActionResponse, Layout, render};
use crate::{AppState, UiError};
use askama::Template;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Html,
};
use eduscan_core::{
    Notice,
    feedback::{FeedbackBoard, FeedbackStatus, StudentFeedback},
};
use eduscan_session::Session;
use serde::{Deserialize, Serialize};
use tracing::info;

struct FeedbackView {
    id: String,
    student_name: String,
    subject: String,
    score: u32,
    max_score: u32,
    score_band: &'static str,
    ai_feedback: String,
    custom_feedback: String,
    status: &'static str,
    is_sent: bool,
    last_modified: String,
}

impl From<&StudentFeedback> for FeedbackView {
    fn from(feedback: &StudentFeedback) -> Self {
        Self {
            id: feedback.id.clone(),
            student_name: feedback.student_name.clone(),
            subject: feedback.subject.clone(),
            score: feedback.score,
            max_score: feedback.max_score,
            score_band: feedback.score_band().as_str(),
            ai_feedback: feedback.ai_generated_feedback.clone(),
            custom_feedback: feedback.custom_feedback.clone(),
            status: feedback.status.as_str(),
            is_sent: feedback.status == FeedbackStatus::Sent,
            last_modified: feedback.last_modified.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Headline counts for the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total: usize,
    pub sent: usize,
    pub pending: usize,
    /// Rounded mean score
    pub average_score: u32,
}

impl FeedbackSummary {
    fn from_board(board: &FeedbackBoard) -> Self {
        let feedbacks = board.feedbacks();
        let total = feedbacks.len();
        let average_score = if total == 0 {
            0
        } else {
            let sum: u64 = feedbacks.iter().map(|f| f.score as u64).sum();
            (sum as f64 / total as f64).round() as u32
        };

        Self {
            total,
            sent: board.count_by_status(FeedbackStatus::Sent),
            pending: board.count_by_status(FeedbackStatus::Pending),
            average_score,
        }
    }
}

#[derive(Template)]
#[template(path = "feedback.html")]
struct FeedbackTemplate {
    layout: Layout,
    summary: FeedbackSummary,
    feedbacks: Vec<FeedbackView>,
}

pub async fn feedback_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, UiError> {
    let board = state.feedback.read().await;
    render(&FeedbackTemplate {
        layout: Layout::new("feedback", &session),
        summary: FeedbackSummary::from_board(&board),
        feedbacks: board.feedbacks().iter().map(FeedbackView::from).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub summary: FeedbackSummary,
    pub feedbacks: Vec<StudentFeedback>,
}

pub async fn list_feedback(State(state): State<AppState>) -> Json<FeedbackListResponse> {
    let board = state.feedback.read().await;
    Json(FeedbackListResponse {
        summary: FeedbackSummary::from_board(&board),
        feedbacks: board.feedbacks().to_vec(),
    })
}

/// Append one provider suggestion to the AI feedback
pub async fn generate_ai_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<StudentFeedback>>, UiError> {
    if state.feedback.read().await.get(&id).is_none() {
        return Err(UiError::NotFound(format!("feedback not found: {}", id)));
    }

    let suggestion = state.provider.feedback_suggestion().await?;
    let feedback = state
        .feedback
        .write()
        .await
        .append_ai_suggestion(&id, &suggestion)?;
    state.metrics.record_feedback_generated();

    let notice = Notice::new(
        "AI Feedback Enhanced",
        "Additional personalized suggestions have been generated.",
    );
    Ok(Json(ActionResponse::with_notice(feedback, notice)))
}

#[derive(Debug, Deserialize)]
pub struct CustomFeedbackUpdate {
    pub text: String,
}

pub async fn update_custom_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CustomFeedbackUpdate>,
) -> Result<Json<ActionResponse<StudentFeedback>>, UiError> {
    let feedback = state
        .feedback
        .write()
        .await
        .update_custom_feedback(&id, update.text)?;
    Ok(Json(ActionResponse::new(feedback)))
}

pub async fn send_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<StudentFeedback>>, UiError> {
    let feedback = state.feedback.write().await.send(&id)?;
    state.metrics.record_feedback_sent();
    info!("Feedback {} sent to {}", feedback.id, feedback.student_name);

    let notice = Notice::new(
        "Feedback Sent",
        format!("Personalized feedback sent to {}", feedback.student_name),
    );
    Ok(Json(ActionResponse::with_notice(feedback, notice)))
}
