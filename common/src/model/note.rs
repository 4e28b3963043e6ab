use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated study note, covering a single subtopic of a syllabus.
/// `content` is markdown; `ord` is the 0-based position within the
/// generation batch and is strictly increasing per syllabus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub syllabus_id: i64,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub subtopic: String,
    pub ord: i64,
    pub created_at: DateTime<Utc>,
}
