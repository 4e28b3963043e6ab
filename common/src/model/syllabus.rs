use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-supplied course document that seeds all content generation.
///
/// `content` holds the text the user typed, or the LLM-structured summary of
/// an uploaded PDF. `file_path` points at the stored PDF when the syllabus
/// was created by upload; text-only syllabi have no file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Syllabus {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}
