use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The six supported question kinds. The variant decides how a submitted
/// answer is graded: exact match, case-insensitive match, ordered-sequence
/// equality, or LLM-scored free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillBlank,
    DragDrop,
    Ordering,
    ShortAnswer,
    LongAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::FillBlank => "fill_blank",
            QuestionType::DragDrop => "drag_drop",
            QuestionType::Ordering => "ordering",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::LongAnswer => "long_answer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "fill_blank" => Some(QuestionType::FillBlank),
            "drag_drop" => Some(QuestionType::DragDrop),
            "ordering" => Some(QuestionType::Ordering),
            "short_answer" => Some(QuestionType::ShortAnswer),
            "long_answer" => Some(QuestionType::LongAnswer),
            _ => None,
        }
    }

}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub assignment_id: i64,
    pub question_type: QuestionType,
    pub question_text: String,
    /// Choice/sequence items; absent for free-text questions.
    pub options: Option<Vec<String>>,
    /// Plain text, or a JSON-encoded list for sequence questions.
    pub correct_answer: String,
    pub points: i64,
    pub ord: i64,
    pub topic: String,
    pub subtopic: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub user_id: i64,
    pub syllabus_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
    /// JSON-encoded map of question key to the submitted answer, written on
    /// submission. Resubmission overwrites.
    pub student_answers: Option<String>,
    /// JSON-encoded list of `AnswerFeedback`, written on submission.
    pub ai_feedback: Option<String>,
    pub total_points: i64,
    pub earned_points: i64,
}

/// Per-question grading outcome returned to the client and persisted on the
/// assignment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub question_id: String,
    pub is_correct: bool,
    pub feedback: String,
}
