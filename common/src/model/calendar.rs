use serde::{Deserialize, Serialize};

/// A calendar entry derived from a todo or an assignment due date, in the
/// shape the calendar page's script expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(rename = "extendedProps")]
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventProps {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllabus_id: Option<i64>,
}
