//! About page handler

use crate::handlers::{Layout, render};
use crate::UiError;
use askama::Template;
use axum::{Extension, response::Html};
use eduscan_session::Session;

struct Feature {
    title: &'static str,
    description: &'static str,
}

struct Impact {
    title: &'static str,
    description: &'static str,
    stat: &'static str,
}

struct SdgGoal {
    number: u8,
    title: &'static str,
    description: &'static str,
}

const FEATURES: &[Feature] = &[
    Feature {
        title: "Fast AI Processing",
        description: "Grade hundreds of papers in minutes with advanced OCR and AI analysis",
    },
    Feature {
        title: "Bias-Free Evaluation",
        description: "Sophisticated algorithms detect and prevent unfair grading practices",
    },
    Feature {
        title: "Transparent Scoring",
        description: "Clear explanations for every grade with confidence levels",
    },
    Feature {
        title: "Teacher Collaboration",
        description: "Human oversight with easy override and feedback capabilities",
    },
];

const IMPACTS: &[Impact] = &[
    Impact {
        title: "Global Education Access",
        description: "Making quality assessment available to underserved communities worldwide",
        stat: "50K+ students reached",
    },
    Impact {
        title: "Reduced Teacher Workload",
        description: "Freeing educators to focus on teaching rather than repetitive grading",
        stat: "75% time savings",
    },
    Impact {
        title: "Improved Learning Outcomes",
        description: "Faster feedback loops help students learn more effectively",
        stat: "23% grade improvement",
    },
    Impact {
        title: "Educational Equity",
        description: "Ensuring fair assessment regardless of background or location",
        stat: "Zero bias incidents",
    },
];

const SDG_GOALS: &[SdgGoal] = &[
    SdgGoal {
        number: 4,
        title: "Quality Education",
        description: "Ensure inclusive and equitable quality education and promote lifelong learning opportunities for all",
    },
    SdgGoal {
        number: 10,
        title: "Reduced Inequalities",
        description: "Reduce inequality within and among countries through fair assessment practices",
    },
];

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
    layout: Layout,
    features: &'static [Feature],
    impacts: &'static [Impact],
    sdg_goals: &'static [SdgGoal],
}

pub async fn about_page(Extension(session): Extension<Session>) -> Result<Html<String>, UiError> {
    render(&AboutTemplate {
        layout: Layout::new("about", &session),
        features: FEATURES,
        impacts: IMPACTS,
        sdg_goals: SDG_GOALS,
    })
}
