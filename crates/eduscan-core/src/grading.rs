//! Auto-grading board
//!
//! Holds the AI-scored answers shown on the dashboard and the teacher
//! overrides applied to them. The board is plain owned state; callers that
//! share it across tasks wrap it in a lock.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One AI-graded student answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub id: String,
    pub student_name: String,
    pub question: String,
    pub student_answer: String,
    pub ai_score: u32,
    pub max_score: u32,
    /// AI confidence in percent (0-100)
    pub confidence: u32,
    pub bias_alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_feedback: Option<String>,
    #[serde(default)]
    pub is_editing: bool,
}

impl GradedAnswer {
    /// Teacher override if present, AI score otherwise
    pub fn effective_score(&self) -> u32 {
        self.teacher_score.unwrap_or(self.ai_score)
    }

    pub fn is_overridden(&self) -> bool {
        self.teacher_score.is_some() || self.teacher_feedback.is_some()
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::classify(self.effective_score(), self.max_score)
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::classify(self.confidence)
    }
}

/// Display band for a score relative to its maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    /// `>= 80%` good, `>= 60%` fair, anything else poor
    pub fn classify(score: u32, max_score: u32) -> Self {
        if max_score == 0 {
            return ScoreBand::Poor;
        }
        let percentage = score as f64 / max_score as f64 * 100.0;
        if percentage >= 80.0 {
            ScoreBand::Good
        } else if percentage >= 60.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

/// Display band for AI confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// `>= 85` high, `>= 70` medium, anything else low
    pub fn classify(confidence: u32) -> Self {
        if confidence >= 85 {
            ConfidenceBand::High
        } else if confidence >= 70 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingSummary {
    pub total_answers: usize,
    pub average_score: u32,
    pub average_confidence: u32,
    pub bias_alerts: usize,
}

/// Working set of graded answers with teacher overrides
#[derive(Debug, Clone, Default)]
pub struct GradingBoard {
    answers: Vec<GradedAnswer>,
}

impl GradingBoard {
    pub fn new(answers: Vec<GradedAnswer>) -> Self {
        Self { answers }
    }

    pub fn answers(&self) -> &[GradedAnswer] {
        &self.answers
    }

    pub fn get(&self, id: &str) -> Option<&GradedAnswer> {
        self.answers.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut GradedAnswer> {
        self.answers
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::AnswerNotFound(id.to_string()))
    }

    /// Flip edit mode, returning the new value
    pub fn toggle_edit(&mut self, id: &str) -> Result<bool> {
        let answer = self.get_mut(id)?;
        answer.is_editing = !answer.is_editing;
        Ok(answer.is_editing)
    }

    /// Set the teacher score, clamped to `0..=max_score`
    pub fn update_score(&mut self, id: &str, score: i64) -> Result<u32> {
        let answer = self.get_mut(id)?;
        let clamped = score.clamp(0, answer.max_score as i64) as u32;
        if clamped as i64 != score {
            debug!("Clamped teacher score {} to {} for answer {}", score, clamped, id);
        }
        answer.teacher_score = Some(clamped);
        Ok(clamped)
    }

    pub fn update_feedback(&mut self, id: &str, feedback: impl Into<String>) -> Result<()> {
        let answer = self.get_mut(id)?;
        answer.teacher_feedback = Some(feedback.into());
        Ok(())
    }

    /// Leave edit mode and return the saved answer
    pub fn save(&mut self, id: &str) -> Result<GradedAnswer> {
        let answer = self.get_mut(id)?;
        answer.is_editing = false;
        Ok(answer.clone())
    }

    /// Drop teacher score and feedback, reverting to the AI grading
    pub fn reset_to_ai(&mut self, id: &str) -> Result<GradedAnswer> {
        let answer = self.get_mut(id)?;
        answer.teacher_score = None;
        answer.teacher_feedback = None;
        Ok(answer.clone())
    }

    pub fn summary(&self) -> GradingSummary {
        let total = self.answers.len();
        let mean = |sum: u64| -> u32 {
            if total == 0 {
                0
            } else {
                (sum as f64 / total as f64).round() as u32
            }
        };

        GradingSummary {
            total_answers: total,
            average_score: mean(self.answers.iter().map(|a| a.ai_score as u64).sum()),
            average_confidence: mean(self.answers.iter().map(|a| a.confidence as u64).sum()),
            bias_alerts: self.answers.iter().filter(|a| a.bias_alert).count(),
        }
    }
}
