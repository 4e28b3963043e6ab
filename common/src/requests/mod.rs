use std::collections::BTreeMap;

use serde::Deserialize;

use crate::generation::AnswerValue;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Text-only syllabus creation; PDF uploads go through multipart instead.
#[derive(Debug, Deserialize)]
pub struct CreateSyllabusRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub syllabus_id: i64,
}

/// Date range for a study plan, ISO dates (`YYYY-MM-DD` or RFC 3339).
#[derive(Debug, Deserialize)]
pub struct GenerateStudyPlanRequest {
    pub start_date: String,
    pub end_date: String,
}

/// Submitted answers keyed by `q{question_id}`. Sequence answers may arrive
/// as a JSON list or as a JSON-encoded string of one.
#[derive(Debug, Deserialize)]
pub struct SubmitAssignmentRequest {
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<i64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<i64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}
