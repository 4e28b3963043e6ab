use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection};
use serde_json::json;

use common::generation::StudyPlanPayload;
use common::requests::GenerateStudyPlanRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::session::AuthedUser;
use crate::util::parse_datetime;

const STUDY_PLAN_SYSTEM_PROMPT: &str = r#"You are an expert academic planner. Your task is to create a comprehensive study plan based on the user's syllabi, assignments, and todos.

IMPORTANT: Your response MUST be valid JSON with this exact structure:
{
    "title": "Study Plan Title",
    "days": [
        {
            "date": "YYYY-MM-DD",
            "sessions": [
                {
                    "start_time": "HH:MM",
                    "end_time": "HH:MM",
                    "activity_type": "study",
                    "title": "Session Title",
                    "description": "Detailed description of the study session",
                    "syllabus_id": 1,
                    "assignment_id": 2,
                    "todo_id": 3
                }
            ]
        }
    ]
}

The id fields are optional: syllabus_id only for study activities,
assignment_id only for assignment work, todo_id only for todo work.
activity_type is one of "study", "assignment", "break", "review".

Guidelines:
1. Create a balanced study plan across all syllabi
2. Schedule time for assignments based on their due dates
3. Include regular breaks and review sessions for earlier material
4. Plan for 3-5 study sessions per day, each 1-2 hours long
5. Prioritize assignments with closer due dates

IMPORTANT: Your entire response must be ONLY valid JSON.
Do not include any explanations, markdown formatting, or other text."#;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    payload: web::Json<GenerateStudyPlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let start_date = parse_datetime(&payload.start_date)?;
    let end_date = parse_datetime(&payload.end_date)?;
    if end_date < start_date {
        return Err(ApiError::Validation(
            "End date must not be before the start date".to_string(),
        ));
    }

    let conn = db::open(&cfg)?;
    let input = plan_input(&conn, user.id, start_date, end_date)?;

    let client = LlmClient::new(&cfg);
    let raw = client.chat_json(STUDY_PLAN_SYSTEM_PROMPT, &input).await?;
    let (structure, plan) = super::parse_payload::<StudyPlanPayload>(&raw)?;

    let plan_id = insert_plan(&conn, user.id, &plan.title, start_date, end_date, &raw)?;
    info!("generated study plan {} for user {}", plan_id, user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Study plan generated successfully",
        "id": plan_id,
        "plan": structure,
    })))
}

/// Serialize everything the planner should know about: each syllabus with
/// its note topics and assignments, plus the user's open todos and the
/// requested date range.
fn plan_input(
    conn: &Connection,
    user_id: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<String, ApiError> {
    let syllabi = db::syllabi_for_user(conn, user_id)?;
    if syllabi.is_empty() {
        return Err(ApiError::Validation(
            "You need at least one syllabus to generate a study plan".to_string(),
        ));
    }

    let mut syllabi_data = Vec::new();
    for syllabus in &syllabi {
        let mut topics: serde_json::Map<String, serde_json::Value> = serde_json::Map::new();
        for note in db::notes_for_syllabus(conn, syllabus.id)? {
            let subtopics = topics
                .entry(note.topic)
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let Some(items) = subtopics.as_array_mut() {
                items.push(json!(note.subtopic));
            }
        }
        let assignments: Vec<serde_json::Value> = db::assignments_for_syllabus(conn, syllabus.id)?
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "title": a.title,
                    "due_date": a.due_date.to_rfc3339(),
                })
            })
            .collect();
        syllabi_data.push(json!({
            "id": syllabus.id,
            "title": syllabus.title,
            "topics": topics,
            "assignments": assignments,
        }));
    }

    let todos: Vec<serde_json::Value> = db::open_todos_for_user(conn, user_id)?
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "title": t.title,
                "priority": t.priority,
                "due_date": t.due_date.map(|d| d.to_rfc3339()),
            })
        })
        .collect();

    let days_count = (end_date.date_naive() - start_date.date_naive()).num_days() + 1;
    let input = json!({
        "start_date": start_date.to_rfc3339(),
        "end_date": end_date.to_rfc3339(),
        "days_count": days_count,
        "syllabi": syllabi_data,
        "todos": todos,
    });
    serde_json::to_string(&input).map_err(|e| ApiError::Internal(format!("plan input: {}", e)))
}

/// A study plan is a single row; the raw completion text is the content.
fn insert_plan(
    conn: &Connection,
    user_id: i64,
    title: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    content: &str,
) -> Result<i64, ApiError> {
    conn.execute(
        "INSERT INTO study_plans (user_id, title, start_date, end_date, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![user_id, title, start_date, end_date, content, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_input_requires_a_syllabus() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let err = plan_input(&conn, 1, Utc::now(), Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn plan_input_groups_note_subtopics_by_topic() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (username, email, password_hash, created_at)
               VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z');
             INSERT INTO syllabi (user_id, title, content, created_at)
               VALUES (1, 's', 'c', '2026-01-01T00:00:00Z');
             INSERT INTO notes (syllabus_id, title, content, topic, subtopic, ord, created_at)
               VALUES (1, 'n1', 'c', 'Algebra', 'Groups', 0, '2026-01-01T00:00:00Z');
             INSERT INTO notes (syllabus_id, title, content, topic, subtopic, ord, created_at)
               VALUES (1, 'n2', 'c', 'Algebra', 'Rings', 1, '2026-01-01T00:00:00Z');",
        )
        .unwrap();

        let start = parse_datetime("2026-03-01").unwrap();
        let end = parse_datetime("2026-03-07").unwrap();
        let input: serde_json::Value =
            serde_json::from_str(&plan_input(&conn, 1, start, end).unwrap()).unwrap();

        assert_eq!(input["days_count"], 7);
        assert_eq!(
            input["syllabi"][0]["topics"]["Algebra"],
            json!(["Groups", "Rings"])
        );
    }
}
