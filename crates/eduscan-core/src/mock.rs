//! Mock grading provider with canned data

use crate::{
    Result,
    analytics::{
        AnalyticsReport, BiasBucket, FairnessIndicator, Insight, KeyMetrics, PerformanceTrend,
        SubjectScore,
    },
    feedback::{FeedbackStatus, StudentFeedback},
    grading::GradedAnswer,
    provider::GradingProvider,
};
use chrono::{TimeZone, Utc};
use rand::seq::IndexedRandom;

const SUGGESTIONS: [&str; 5] = [
    "Consider elaborating on the scientific principles behind your answer.",
    "Great work! Adding real-world examples would make your response even stronger.",
    "Your understanding is solid. Try connecting your ideas to current research or applications.",
    "Excellent critical thinking! Consider exploring counterarguments to show deeper analysis.",
    "Good foundation. Expanding on the implications and consequences would enhance your response.",
];

/// Hardcoded grading data; suggestions are picked at random
#[derive(Debug, Clone, Default)]
pub struct MockGradingProvider;

impl MockGradingProvider {
    pub fn new() -> Self {
        Self
    }

    /// All suggestions `feedback_suggestion` can return
    pub fn suggestions() -> &'static [&'static str] {
        &SUGGESTIONS
    }

    fn answer(
        id: &str,
        student_name: &str,
        question: &str,
        student_answer: &str,
        ai_score: u32,
        confidence: u32,
        bias_alert: bool,
    ) -> GradedAnswer {
        GradedAnswer {
            id: id.to_string(),
            student_name: student_name.to_string(),
            question: question.to_string(),
            student_answer: student_answer.to_string(),
            ai_score,
            max_score: 100,
            confidence,
            bias_alert,
            teacher_score: None,
            teacher_feedback: None,
            is_editing: false,
        }
    }
}

#[async_trait::async_trait]
impl GradingProvider for MockGradingProvider {
    async fn graded_answers(&self) -> Result<Vec<GradedAnswer>> {
        Ok(vec![
            Self::answer(
                "1",
                "Alice Johnson",
                "Explain the process of photosynthesis and its importance in the ecosystem.",
                "Photosynthesis is the process where plants use sunlight, carbon dioxide, and water to make glucose and oxygen. The chloroplasts in plant cells contain chlorophyll which captures light energy. This process is important because it produces oxygen that we breathe and glucose that serves as food for plants and animals in the food chain.",
                85,
                92,
                false,
            ),
            Self::answer(
                "2",
                "Marcus Chen",
                "What are the main causes of climate change?",
                "Climate change is caused by greenhouse gases like CO2 from burning fossil fuels. Also deforestation reduces trees that absorb CO2. Industrial processes and agriculture also contribute.",
                72,
                78,
                true,
            ),
            Self::answer(
                "3",
                "Emma Williams",
                "Describe the water cycle and its stages.",
                "Water cycle has evaporation when sun heats water and it becomes vapor. Then condensation makes clouds. Precipitation is rain or snow falling down. Collection is when water goes back to oceans and rivers.",
                68,
                85,
                false,
            ),
        ])
    }

    async fn student_feedback(&self) -> Result<Vec<StudentFeedback>> {
        let at = |hour: u32, minute: u32| {
            Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0)
                .single()
                .unwrap_or_else(Utc::now)
        };

        Ok(vec![
            StudentFeedback {
                id: "1".to_string(),
                student_name: "Alice Johnson".to_string(),
                subject: "Biology".to_string(),
                score: 85,
                max_score: 100,
                ai_generated_feedback: "Excellent understanding of photosynthesis! Your explanation clearly demonstrates the process steps and ecological importance. To further improve, consider adding more specific examples of different plant types and their photosynthetic adaptations.".to_string(),
                custom_feedback: String::new(),
                status: FeedbackStatus::Draft,
                last_modified: at(10, 30),
            },
            StudentFeedback {
                id: "2".to_string(),
                student_name: "Marcus Chen".to_string(),
                subject: "Environmental Science".to_string(),
                score: 72,
                max_score: 100,
                ai_generated_feedback: "Good grasp of climate change causes. Your answer covers the main factors effectively. However, expanding on the interconnections between different causes and their relative impacts would strengthen your response. Consider including more recent data and examples.".to_string(),
                custom_feedback: "Marcus, I particularly liked how you mentioned industrial processes. For next time, try to include specific examples like the Paris Agreement or recent climate initiatives.".to_string(),
                status: FeedbackStatus::Pending,
                last_modified: at(9, 15),
            },
            StudentFeedback {
                id: "3".to_string(),
                student_name: "Emma Williams".to_string(),
                subject: "Earth Science".to_string(),
                score: 68,
                max_score: 100,
                ai_generated_feedback: "You've covered the basic stages of the water cycle well. Your understanding of evaporation, condensation, and precipitation is clear. To improve, focus on explaining the driving forces behind each stage and how human activities can impact the water cycle.".to_string(),
                custom_feedback: String::new(),
                status: FeedbackStatus::Draft,
                last_modified: at(8, 45),
            },
        ])
    }

    async fn analytics(&self) -> Result<AnalyticsReport> {
        let weeks = (1..=6).map(|w| format!("Week {}", w)).collect();
        let subjects = [
            ("Mathematics", 85.0),
            ("Science", 78.0),
            ("English", 82.0),
            ("History", 75.0),
            ("Geography", 80.0),
        ];
        let bias = [
            ("No Bias Detected", 78.0),
            ("Low Risk", 15.0),
            ("Medium Risk", 5.0),
            ("High Risk", 2.0),
        ];

        Ok(AnalyticsReport {
            key_metrics: KeyMetrics {
                total_students: 248,
                average_score: 79.5,
                ai_accuracy: 89.2,
                bias_alert_rate: 7.0,
            },
            performance_trend: PerformanceTrend {
                labels: weeks,
                class_average: vec![72.0, 75.0, 78.0, 74.0, 81.0, 85.0],
                ai_confidence: vec![88.0, 85.0, 90.0, 87.0, 92.0, 94.0],
            },
            subject_performance: subjects
                .iter()
                .map(|(subject, score)| SubjectScore {
                    subject: subject.to_string(),
                    average_score: *score,
                })
                .collect(),
            bias_distribution: bias
                .iter()
                .map(|(label, share)| BiasBucket {
                    label: label.to_string(),
                    share: *share,
                })
                .collect(),
            insights: vec![
                Insight {
                    title: "Strong Performance Trend".to_string(),
                    description: "Class average has improved by 18% over the last 6 weeks, showing consistent upward trajectory.".to_string(),
                },
                Insight {
                    title: "Areas for Attention".to_string(),
                    description: "History and Geography subjects show lower average scores. Consider additional support resources.".to_string(),
                },
                Insight {
                    title: "High AI Confidence".to_string(),
                    description: "94% average confidence in AI scoring suggests reliable automated grading for most assignments.".to_string(),
                },
            ],
            fairness: vec![
                FairnessIndicator {
                    label: "Bias-Free Scores".to_string(),
                    value: "93%".to_string(),
                    status: "Excellent".to_string(),
                },
                FairnessIndicator {
                    label: "Gender Parity".to_string(),
                    value: "Equal".to_string(),
                    status: "Balanced".to_string(),
                },
                FairnessIndicator {
                    label: "Cultural Bias".to_string(),
                    value: "No".to_string(),
                    status: "Clear".to_string(),
                },
                FairnessIndicator {
                    label: "Manual Reviews".to_string(),
                    value: "2".to_string(),
                    status: "Pending".to_string(),
                },
            ],
        })
    }

    async fn feedback_suggestion(&self) -> Result<String> {
        let mut rng = rand::rng();
        let suggestion = SUGGESTIONS.choose(&mut rng).copied().unwrap_or(SUGGESTIONS[0]);
        Ok(suggestion.to_string())
    }

    async fn extract_text(&self, file_name: &str) -> Result<String> {
        Ok(format!(
            "Sample OCR text extracted from {}:\n\n\
             Question 1: What is the capital of France?\n\
             Answer: Paris\n\n\
             Question 2: Calculate 2 + 2\n\
             Answer: 4\n\n\
             Overall Score: 85/100",
            file_name
        ))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
