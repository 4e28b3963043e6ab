//! Strict shapes for the JSON documents the language model is asked to
//! produce. Every generation endpoint parses the raw completion text into one
//! of these structs before touching the database; a shape mismatch fails the
//! whole generation and nothing is persisted.

use serde::{Deserialize, Serialize};

/// An answer value as produced by the model or submitted by a student:
/// either plain text or a list of items (sequence questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
}

fn default_points() -> i64 {
    1
}

/// Response shape for note generation:
/// `{title, topics: [{title, subtopics: [{title, content, key_points,
/// examples, summary}]}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesPayload {
    pub title: String,
    pub topics: Vec<NotesTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesTopic {
    pub title: String,
    pub subtopics: Vec<NotesSubtopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesSubtopic {
    pub title: String,
    pub content: String,
    pub key_points: Vec<String>,
    pub examples: Vec<String>,
    pub summary: String,
}

/// Response shape for assignment generation. Questions are nested under
/// topic/subtopic headings; the backend flattens them into rows with a
/// monotonically increasing order.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentPayload {
    pub title: String,
    pub description: String,
    pub topics: Vec<AssignmentTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentTopic {
    pub title: String,
    pub subtopics: Vec<AssignmentSubtopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentSubtopic {
    pub title: String,
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub question_type: crate::model::assignment::QuestionType,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: AnswerValue,
    #[serde(default = "default_points")]
    pub points: i64,
    #[serde(default)]
    pub explanation: String,
}

/// Response shape for study-plan generation. The raw JSON text is what gets
/// persisted; parsing it here only validates the shape before commit.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyPlanPayload {
    pub title: String,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanDay {
    pub date: String,
    pub sessions: Vec<PlanSession>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanSession {
    pub start_time: String,
    pub end_time: String,
    pub activity_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub syllabus_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub todo_id: Option<i64>,
}

/// Verdict returned by the model when scoring a free-text answer.
/// `score` is clamped to 0..=1 by the grader; `>= 0.7` counts as correct.
#[derive(Debug, Clone, Deserialize)]
pub struct EssayEvaluation {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}
