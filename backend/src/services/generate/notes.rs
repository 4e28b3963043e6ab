use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};
use serde_json::json;

use common::generation::NotesPayload;
use common::requests::GenerateRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::session::AuthedUser;

const NOTES_SYSTEM_PROMPT: &str = r#"You are an expert educational content generator. Your task is to create comprehensive study notes.

IMPORTANT: Your response MUST be valid JSON with this exact structure:
{
    "title": "Study Notes for [Course Name]",
    "topics": [
        {
            "title": "Topic Title",
            "subtopics": [
                {
                    "title": "Subtopic Title",
                    "content": "Detailed notes content with markdown formatting",
                    "key_points": ["Point 1", "Point 2", "Point 3"],
                    "examples": ["Example 1", "Example 2"],
                    "summary": "Brief summary of the subtopic"
                }
            ]
        }
    ]
}

Guidelines:
1. Create 2-3 main topics based on the syllabus
2. Each topic should have 2-3 subtopics
3. Use markdown formatting for better readability
4. Include key points, examples, and summaries for each subtopic
5. Use bullet points, lists, and headings for organization

IMPORTANT: Your entire response must be ONLY valid JSON.
Do not include any explanations, markdown formatting outside of content fields, or other text."#;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    payload: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut conn = db::open(&cfg)?;
    let syllabus = super::owned_syllabus(&conn, payload.syllabus_id, &user)?;
    let source = super::source_text(&syllabus);

    let client = LlmClient::new(&cfg);
    let raw = client.chat_json(NOTES_SYSTEM_PROMPT, &source).await?;
    let (structure, notes) = super::parse_payload::<NotesPayload>(&raw)?;

    let created = insert_notes(&mut conn, syllabus.id, &notes)?;
    info!("generated {} notes for syllabus {}", created, syllabus.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Notes generated successfully",
        "structure": structure,
    })))
}

/// Persist one note per subtopic, inside a single transaction. Ordering
/// continues after any notes the syllabus already has, so positions stay
/// strictly increasing across repeated generations.
fn insert_notes(
    conn: &mut Connection,
    syllabus_id: i64,
    payload: &NotesPayload,
) -> Result<usize, ApiError> {
    let tx = conn.transaction()?;
    let base: i64 = tx.query_row(
        "SELECT COALESCE(MAX(ord) + 1, 0) FROM notes WHERE syllabus_id = ?1",
        params![syllabus_id],
        |row| row.get(0),
    )?;

    let mut ord = base;
    for topic in &payload.topics {
        for subtopic in &topic.subtopics {
            let key_points: String = subtopic
                .key_points
                .iter()
                .map(|p| format!("- {}\n", p))
                .collect();
            let examples: String = subtopic
                .examples
                .iter()
                .map(|e| format!("- {}\n", e))
                .collect();
            let content = format!(
                "# {}\n\n{}\n\n## Key Points\n{}\n## Examples\n{}\n## Summary\n{}",
                subtopic.title, subtopic.content, key_points, examples, subtopic.summary
            );

            tx.execute(
                "INSERT INTO notes (syllabus_id, title, content, topic, subtopic, ord, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    syllabus_id,
                    format!("{}: {}", topic.title, subtopic.title),
                    content,
                    topic.title,
                    subtopic.title,
                    ord,
                    Utc::now(),
                ],
            )?;
            ord += 1;
        }
    }
    tx.commit()?;
    Ok((ord - base) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (username, email, password_hash, created_at)
               VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z');
             INSERT INTO syllabi (user_id, title, content, created_at)
               VALUES (1, 's', 'c', '2026-01-01T00:00:00Z');",
        )
        .unwrap();
        conn
    }

    fn sample_payload() -> NotesPayload {
        serde_json::from_str(
            r#"{
                "title": "Study Notes for Rust",
                "topics": [
                    {"title": "Ownership", "subtopics": [
                        {"title": "Moves", "content": "Values move.",
                         "key_points": ["One owner"], "examples": ["let b = a;"],
                         "summary": "Moves transfer ownership."},
                        {"title": "Borrows", "content": "References borrow.",
                         "key_points": ["No aliasing with mut"], "examples": ["&x"],
                         "summary": "Borrowing is temporary."}
                    ]},
                    {"title": "Lifetimes", "subtopics": [
                        {"title": "Elision", "content": "Rules fill in lifetimes.",
                         "key_points": ["Three rules"], "examples": ["fn f(&self)"],
                         "summary": "Mostly implicit."}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn notes_are_flattened_in_order_with_sectioned_bodies() {
        let mut conn = seeded_conn();
        let created = insert_notes(&mut conn, 1, &sample_payload()).unwrap();
        assert_eq!(created, 3);

        let notes = crate::db::notes_for_syllabus(&conn, 1).unwrap();
        let ords: Vec<i64> = notes.iter().map(|n| n.ord).collect();
        assert_eq!(ords, vec![0, 1, 2]);
        assert_eq!(notes[0].title, "Ownership: Moves");
        assert_eq!(notes[2].topic, "Lifetimes");

        let body = &notes[0].content;
        let content_pos = body.find("Values move.").unwrap();
        let key_pos = body.find("## Key Points").unwrap();
        let examples_pos = body.find("## Examples").unwrap();
        let summary_pos = body.find("## Summary").unwrap();
        assert!(content_pos < key_pos && key_pos < examples_pos && examples_pos < summary_pos);
        assert!(body.contains("- One owner"));
    }

    #[test]
    fn repeated_generation_keeps_order_strictly_increasing() {
        let mut conn = seeded_conn();
        insert_notes(&mut conn, 1, &sample_payload()).unwrap();
        insert_notes(&mut conn, 1, &sample_payload()).unwrap();

        let ords: Vec<i64> = crate::db::notes_for_syllabus(&conn, 1)
            .unwrap()
            .iter()
            .map(|n| n.ord)
            .collect();
        assert_eq!(ords, vec![0, 1, 2, 3, 4, 5]);
    }
}
