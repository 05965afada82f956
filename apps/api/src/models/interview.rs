use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct InterviewRow {
    pub id: i64,
    pub token: String,
    pub candidate_name: String,
    pub email: String,
    pub college: String,
    pub resume_text: String,
    pub questions_json: String,
    pub current_question_index: i64,
    pub answers_json: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four fixed question categories, in interview order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    General,
    Technical,
    Project,
    Experience,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 4] = [
        QuestionCategory::General,
        QuestionCategory::Technical,
        QuestionCategory::Project,
        QuestionCategory::Experience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::General => "general",
            QuestionCategory::Technical => "technical",
            QuestionCategory::Project => "project",
            QuestionCategory::Experience => "experience",
        }
    }

    /// Number of questions the generator is asked to produce.
    pub fn expected_count(&self) -> usize {
        match self {
            QuestionCategory::General => 5,
            QuestionCategory::Technical => 8,
            QuestionCategory::Project => 5,
            QuestionCategory::Experience => 5,
        }
    }
}

/// One interview question tagged with the category it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: QuestionCategory,
    pub text: String,
}

/// One answered question. A transcript is an ordered list of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    pub category: QuestionCategory,
}
