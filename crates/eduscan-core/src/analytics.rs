//! Analytics report types

use serde::{Deserialize, Serialize};

/// Everything the analytics view renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub key_metrics: KeyMetrics,
    pub performance_trend: PerformanceTrend,
    pub subject_performance: Vec<SubjectScore>,
    pub bias_distribution: Vec<BiasBucket>,
    pub insights: Vec<Insight>,
    pub fairness: Vec<FairnessIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_students: u32,
    /// Percent
    pub average_score: f64,
    /// Percent
    pub ai_accuracy: f64,
    /// Percent of graded answers flagged
    pub bias_alert_rate: f64,
}

/// Weekly series for the line chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTrend {
    pub labels: Vec<String>,
    pub class_average: Vec<f64>,
    pub ai_confidence: Vec<f64>,
}

impl PerformanceTrend {
    /// Relative change of the class average between the first and last week, in percent
    pub fn class_average_change(&self) -> Option<f64> {
        let first = *self.class_average.first()?;
        let last = *self.class_average.last()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub subject: String,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasBucket {
    pub label: String,
    /// Percent of graded answers
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessIndicator {
    pub label: String,
    pub value: String,
    pub status: String,
}
