use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use log::info;
use rusqlite::{params, Connection};
use serde_json::json;

use common::generation::{AnswerValue, AssignmentPayload};
use common::requests::GenerateRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::session::AuthedUser;

const ASSIGNMENT_SYSTEM_PROMPT: &str = r#"You are an expert educational content generator. Your task is to create a comprehensive assignment.

IMPORTANT: Your response MUST be valid JSON with this exact structure:
{
    "title": "Assignment Title",
    "description": "Overall description",
    "topics": [
        {
            "title": "Topic Title",
            "subtopics": [
                {
                    "title": "Subtopic Title",
                    "questions": [
                        {
                            "type": "multiple_choice",
                            "text": "Question text",
                            "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
                            "correct_answer": "Correct option",
                            "points": 2,
                            "explanation": "Explanation of the correct answer"
                        },
                        {
                            "type": "fill_blank",
                            "text": "Complete the sentence: The capital of France is _____.",
                            "correct_answer": "Paris",
                            "points": 1,
                            "explanation": "Paris is the capital of France."
                        },
                        {
                            "type": "ordering",
                            "text": "Arrange these events in chronological order:",
                            "options": ["Event 1", "Event 2", "Event 3", "Event 4"],
                            "correct_answer": ["Event 1", "Event 2", "Event 3", "Event 4"],
                            "points": 2,
                            "explanation": "The correct chronological order is..."
                        },
                        {
                            "type": "drag_drop",
                            "text": "Match the following terms with their definitions:",
                            "options": ["Term 1", "Term 2", "Term 3", "Term 4"],
                            "correct_answer": ["Definition 1", "Definition 2", "Definition 3", "Definition 4"],
                            "points": 2,
                            "explanation": "The correct matches are..."
                        },
                        {
                            "type": "short_answer",
                            "text": "What is the main concept of...",
                            "correct_answer": "Expected short answer",
                            "points": 3,
                            "explanation": "The main concept is..."
                        },
                        {
                            "type": "long_answer",
                            "text": "Explain in detail...",
                            "correct_answer": "Expected detailed answer",
                            "points": 5,
                            "explanation": "A detailed explanation should include..."
                        }
                    ]
                }
            ]
        }
    ]
}

Guidelines:
1. Create 2-3 main topics, each with 2-3 subtopics
2. Mix different question types within each subtopic
3. Ensure questions test understanding, not just memorization
4. Include clear explanations for each answer
5. Vary point values based on question complexity

IMPORTANT: Your entire response must be ONLY valid JSON.
Do not include any explanations, markdown formatting, or other text."#;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    payload: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut conn = db::open(&cfg)?;
    let syllabus = super::owned_syllabus(&conn, payload.syllabus_id, &user)?;
    let source = super::source_text(&syllabus);

    let client = LlmClient::new(&cfg);
    let raw = client.chat_json(ASSIGNMENT_SYSTEM_PROMPT, &source).await?;
    let (structure, assignment) = super::parse_payload::<AssignmentPayload>(&raw)?;

    let assignment_id = insert_assignment(&mut conn, user.id, syllabus.id, &assignment)?;
    info!(
        "generated assignment {} for syllabus {}",
        assignment_id, syllabus.id
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Assignment created successfully",
        "id": assignment_id,
        "structure": structure,
    })))
}

/// Persist the assignment and its questions in one transaction. Questions
/// are flattened across topics and subtopics with a 0-based, strictly
/// increasing order; list-valued correct answers are stored JSON-encoded.
fn insert_assignment(
    conn: &mut Connection,
    user_id: i64,
    syllabus_id: i64,
    payload: &AssignmentPayload,
) -> Result<i64, ApiError> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO assignments (user_id, syllabus_id, title, description, due_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            syllabus_id,
            payload.title,
            payload.description,
            Utc::now() + Duration::days(7),
        ],
    )?;
    let assignment_id = tx.last_insert_rowid();

    let mut ord: i64 = 0;
    for topic in &payload.topics {
        for subtopic in &topic.subtopics {
            for question in &subtopic.questions {
                let correct_answer = match &question.correct_answer {
                    AnswerValue::Text(text) => text.clone(),
                    AnswerValue::List(items) => serde_json::to_string(items)
                        .map_err(|e| ApiError::Internal(format!("answer encoding: {}", e)))?,
                };
                let options = match &question.options {
                    Some(items) => Some(
                        serde_json::to_string(items)
                            .map_err(|e| ApiError::Internal(format!("options encoding: {}", e)))?,
                    ),
                    None => None,
                };

                tx.execute(
                    "INSERT INTO questions (assignment_id, question_type, question_text,
                         options, correct_answer, points, ord, topic, subtopic, explanation)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        assignment_id,
                        question.question_type.as_str(),
                        question.text,
                        options,
                        correct_answer,
                        question.points,
                        ord,
                        topic.title,
                        subtopic.title,
                        question.explanation,
                    ],
                )?;
                ord += 1;
            }
        }
    }
    tx.commit()?;
    Ok(assignment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::assignment::QuestionType;

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

    fn sample_payload() -> AssignmentPayload {
        serde_json::from_str(
            r#"{
                "title": "Geography basics",
                "description": "Capitals and rivers",
                "topics": [
                    {"title": "Europe", "subtopics": [
                        {"title": "Capitals", "questions": [
                            {"type": "multiple_choice", "text": "Capital of France?",
                             "options": ["Paris", "Lyon"], "correct_answer": "Paris",
                             "points": 2, "explanation": "Paris is the capital."},
                            {"type": "ordering", "text": "North to south:",
                             "options": ["Oslo", "Rome"],
                             "correct_answer": ["Oslo", "Rome"],
                             "points": 2, "explanation": "Oslo is northernmost."}
                        ]},
                        {"title": "Rivers", "questions": [
                            {"type": "fill_blank",
                             "text": "The longest river in France is the _____.",
                             "correct_answer": "Loire"}
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn questions_are_flattened_with_increasing_order() {
        let mut conn = seeded_conn();
        let id = insert_assignment(&mut conn, 1, 1, &sample_payload()).unwrap();

        let questions = crate::db::questions_for_assignment(&conn, id).unwrap();
        assert_eq!(questions.len(), 3);
        let ords: Vec<i64> = questions.iter().map(|q| q.ord).collect();
        assert_eq!(ords, vec![0, 1, 2]);
        assert_eq!(questions[2].subtopic, "Rivers");
    }

    #[test]
    fn list_answers_are_stored_as_json_and_points_default_to_one() {
        let mut conn = seeded_conn();
        let id = insert_assignment(&mut conn, 1, 1, &sample_payload()).unwrap();

        let questions = crate::db::questions_for_assignment(&conn, id).unwrap();
        let ordering = &questions[1];
        assert_eq!(ordering.question_type, QuestionType::Ordering);
        assert_eq!(ordering.correct_answer, r#"["Oslo","Rome"]"#);

        let fill = &questions[2];
        assert_eq!(fill.correct_answer, "Loire");
        assert_eq!(fill.points, 1);
        assert_eq!(fill.explanation, "");
    }

    #[test]
    fn due_date_is_a_week_out() {
        let mut conn = seeded_conn();
        let id = insert_assignment(&mut conn, 1, 1, &sample_payload()).unwrap();
        let assignment = crate::db::get_assignment(&conn, id).unwrap().unwrap();
        let days = (assignment.due_date - Utc::now()).num_days();
        assert!((6..=7).contains(&days));
    }
}
