//! Personalized feedback composer

use crate::{Error, Result, grading::ScoreBand};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery state of a feedback draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Draft,
    Pending,
    Sent,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Draft => "draft",
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Sent => "sent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFeedback {
    pub id: String,
    pub student_name: String,
    pub subject: String,
    pub score: u32,
    pub max_score: u32,
    pub ai_generated_feedback: String,
    pub custom_feedback: String,
    pub status: FeedbackStatus,
    pub last_modified: DateTime<Utc>,
}

impl StudentFeedback {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::classify(self.score, self.max_score)
    }
}

/// Working set of feedback drafts
#[derive(Debug, Clone, Default)]
pub struct FeedbackBoard {
    feedbacks: Vec<StudentFeedback>,
}

impl FeedbackBoard {
    pub fn new(feedbacks: Vec<StudentFeedback>) -> Self {
        Self { feedbacks }
    }

    pub fn feedbacks(&self) -> &[StudentFeedback] {
        &self.feedbacks
    }

    pub fn get(&self, id: &str) -> Option<&StudentFeedback> {
        self.feedbacks.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut StudentFeedback> {
        self.feedbacks
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::FeedbackNotFound(id.to_string()))
    }

    /// Append an AI suggestion to the generated feedback
    pub fn append_ai_suggestion(&mut self, id: &str, suggestion: &str) -> Result<StudentFeedback> {
        let feedback = self.get_mut(id)?;
        if !feedback.ai_generated_feedback.is_empty() {
            feedback.ai_generated_feedback.push(' ');
        }
        feedback.ai_generated_feedback.push_str(suggestion);
        feedback.last_modified = Utc::now();
        Ok(feedback.clone())
    }

    pub fn update_custom_feedback(
        &mut self,
        id: &str,
        text: impl Into<String>,
    ) -> Result<StudentFeedback> {
        let feedback = self.get_mut(id)?;
        feedback.custom_feedback = text.into();
        feedback.last_modified = Utc::now();
        Ok(feedback.clone())
    }

    /// Mark the draft as sent
    pub fn send(&mut self, id: &str) -> Result<StudentFeedback> {
        let feedback = self.get_mut(id)?;
        feedback.status = FeedbackStatus::Sent;
        feedback.last_modified = Utc::now();
        Ok(feedback.clone())
    }

    pub fn count_by_status(&self, status: FeedbackStatus) -> usize {
        self.feedbacks.iter().filter(|f| f.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(id: &str, status: FeedbackStatus) -> StudentFeedback {
        StudentFeedback {
            id: id.to_string(),
            student_name: format!("Student {}", id),
            subject: "Biology".to_string(),
            score: 85,
            max_score: 100,
            ai_generated_feedback: "Good work.".to_string(),
            custom_feedback: String::new(),
            status,
            last_modified: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_append_ai_suggestion() {
        let mut board = FeedbackBoard::new(vec![draft("1", FeedbackStatus::Draft)]);
        let before = board.get("1").unwrap().last_modified;

        let updated = board.append_ai_suggestion("1", "Add examples.").unwrap();
        assert_eq!(updated.ai_generated_feedback, "Good work. Add examples.");
        assert!(updated.last_modified > before);
    }

    #[test]
    fn test_update_custom_feedback() {
        let mut board = FeedbackBoard::new(vec![draft("1", FeedbackStatus::Draft)]);
        board.update_custom_feedback("1", "See me after class").unwrap();
        assert_eq!(board.get("1").unwrap().custom_feedback, "See me after class");
        assert_eq!(board.get("1").unwrap().status, FeedbackStatus::Draft);
    }

    #[test]
    fn test_send_marks_sent() {
        let mut board = FeedbackBoard::new(vec![
            draft("1", FeedbackStatus::Draft),
            draft("2", FeedbackStatus::Pending),
        ]);
        let sent = board.send("2").unwrap();
        assert_eq!(sent.status, FeedbackStatus::Sent);
        assert_eq!(board.count_by_status(FeedbackStatus::Sent), 1);
        assert_eq!(board.count_by_status(FeedbackStatus::Pending), 0);
    }

    #[test]
    fn test_unknown_feedback() {
        let mut board = FeedbackBoard::default();
        assert!(matches!(board.send("nope"), Err(Error::FeedbackNotFound(_))));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(draft("1", FeedbackStatus::Pending)).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["studentName"], "Student 1");
    }
}
