//! Analytics page handler

use crate::handlers::{Layout, render};
use crate::{AppState, UiError};
use askama::Template;
use axum::{Extension, Json, extract::State, response::Html};
use eduscan_core::analytics::{AnalyticsReport, FairnessIndicator, Insight};
use eduscan_session::Session;

#[derive(Template)]
#[template(path = "analytics.html")]
struct AnalyticsTemplate {
    layout: Layout,
    total_students: u32,
    average_score: String,
    ai_accuracy: String,
    bias_alert_rate: String,
    trend_change: Option<String>,
    insights: Vec<Insight>,
    fairness: Vec<FairnessIndicator>,
}

impl AnalyticsTemplate {
    fn new(layout: Layout, report: AnalyticsReport) -> Self {
        let metrics = &report.key_metrics;
        Self {
            layout,
            total_students: metrics.total_students,
            average_score: format!("{:.1}%", metrics.average_score),
            ai_accuracy: format!("{:.1}%", metrics.ai_accuracy),
            bias_alert_rate: format!("{}%", metrics.bias_alert_rate),
            trend_change: report
                .performance_trend
                .class_average_change()
                .map(|change| format!("{:+.0}%", change)),
            insights: report.insights,
            fairness: report.fairness,
        }
    }
}

/// Charts are drawn client-side from `/api/analytics`
pub async fn analytics_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, UiError> {
    let report = state.provider.analytics().await?;
    render(&AnalyticsTemplate::new(
        Layout::new("analytics", &session),
        report,
    ))
}

pub async fn analytics_report(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>, UiError> {
    Ok(Json(state.provider.analytics().await?))
}
