//! Auto-grading dashboard page and score override API

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
    grading::{GradedAnswer, GradingSummary},
};
use eduscan_session::Session;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Precomputed row for the dashboard template
struct AnswerView {
    id: String,
    student_name: String,
    question: String,
    student_answer: String,
    ai_score: u32,
    max_score: u32,
    effective_score: u32,
    score_band: &'static str,
    confidence: u32,
    confidence_band: &'static str,
    bias_alert: bool,
    is_editing: bool,
    is_overridden: bool,
    teacher_score: String,
    teacher_feedback: String,
}

impl From<&GradedAnswer> for AnswerView {
    fn from(answer: &GradedAnswer) -> Self {
        Self {
            id: answer.id.clone(),
            student_name: answer.student_name.clone(),
            question: answer.question.clone(),
            student_answer: answer.student_answer.clone(),
            ai_score: answer.ai_score,
            max_score: answer.max_score,
            effective_score: answer.effective_score(),
            score_band: answer.score_band().as_str(),
            confidence: answer.confidence,
            confidence_band: answer.confidence_band().as_str(),
            bias_alert: answer.bias_alert,
            is_editing: answer.is_editing,
            is_overridden: answer.is_overridden(),
            teacher_score: answer
                .teacher_score
                .map(|s| s.to_string())
                .unwrap_or_default(),
            teacher_feedback: answer.teacher_feedback.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: Layout,
    summary: GradingSummary,
    answers: Vec<AnswerView>,
    refresh_interval: u64,
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, UiError> {
    let board = state.grading.read().await;
    render(&DashboardTemplate {
        layout: Layout::new("dashboard", &session),
        summary: board.summary(),
        answers: board.answers().iter().map(AnswerView::from).collect(),
        refresh_interval: state.config.refresh_interval,
    })
}

#[derive(Debug, Serialize)]
pub struct GradingBoardResponse {
    pub summary: GradingSummary,
    pub answers: Vec<GradedAnswer>,
}

pub async fn grading_board(State(state): State<AppState>) -> Json<GradingBoardResponse> {
    let board = state.grading.read().await;
    Json(GradingBoardResponse {
        summary: board.summary(),
        answers: board.answers().to_vec(),
    })
}

pub async fn toggle_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<GradedAnswer>>, UiError> {
    let mut board = state.grading.write().await;
    board.toggle_edit(&id)?;
    let answer = board
        .get(&id)
        .cloned()
        .ok_or_else(|| UiError::NotFound(format!("answer not found: {}", id)))?;
    Ok(Json(ActionResponse::new(answer)))
}

#[derive(Debug, Deserialize)]
pub struct ScoreUpdate {
    pub score: i64,
}

/// Set the teacher score; out-of-range values are clamped
pub async fn update_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ScoreUpdate>,
) -> Result<Json<ActionResponse<GradedAnswer>>, UiError> {
    let mut board = state.grading.write().await;
    board.update_score(&id, update.score)?;
    let answer = board
        .get(&id)
        .cloned()
        .ok_or_else(|| UiError::NotFound(format!("answer not found: {}", id)))?;
    Ok(Json(ActionResponse::new(answer)))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackUpdate {
    pub feedback: String,
}

pub async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<FeedbackUpdate>,
) -> Result<Json<ActionResponse<GradedAnswer>>, UiError> {
    let mut board = state.grading.write().await;
    board.update_feedback(&id, update.feedback)?;
    let answer = board
        .get(&id)
        .cloned()
        .ok_or_else(|| UiError::NotFound(format!("answer not found: {}", id)))?;
    Ok(Json(ActionResponse::new(answer)))
}

pub async fn save_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<GradedAnswer>>, UiError> {
    let answer = state.grading.write().await.save(&id)?;
    if answer.is_overridden() {
        state.metrics.record_score_override("save");
    }
    info!("Saved grading for {} ({})", answer.student_name, answer.id);

    let notice = Notice::new(
        "Changes Saved",
        format!("Updated grading for {}", answer.student_name),
    );
    Ok(Json(ActionResponse::with_notice(answer, notice)))
}

pub async fn reset_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<GradedAnswer>>, UiError> {
    let answer = state.grading.write().await.reset_to_ai(&id)?;
    state.metrics.record_score_override("reset");

    let notice = Notice::new("Reset to AI Score", "Reverted to original AI grading");
    Ok(Json(ActionResponse::with_notice(answer, notice)))
}
