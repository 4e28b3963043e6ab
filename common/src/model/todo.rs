use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority scale: 0 = low, 1 = medium, 2 = high.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
