use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated study schedule. `content` is the raw plan JSON exactly as the
/// model returned it; the view layer re-parses it for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
