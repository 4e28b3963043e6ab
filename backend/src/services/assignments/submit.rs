//! # Assignment submission and grading
//!
//! `POST /assignments/{id}/submit` receives the full answer set for an
//! assignment and grades it in one pass.
//!
//! ## Workflow
//!
//! 1. **Ownership**: the assignment must exist and belong to the acting
//!    user; JSON callers get 404/403 otherwise.
//!
//! 2. **Resolution**: every `q{id}` key is resolved to a question row
//!    before any grading happens. A key that does not resolve to a question
//!    of this assignment rejects the whole submission as a validation
//!    failure, so a bad payload can never mutate the row.
//!
//! 3. **Grading**, per question type:
//!    - `multiple_choice`: trimmed string equality.
//!    - `fill_blank`: trimmed, case-insensitive equality.
//!    - `ordering` / `drag_drop`: both sides decoded to string sequences
//!      (the submitted value may arrive as a JSON-encoded string), then
//!      compared for exact sequence equality, order included.
//!    - `short_answer` / `long_answer`: the language model scores the
//!      answer against the expected one and returns `{score, feedback}`;
//!      `score >= 0.7` counts as correct. A failed call or an unparseable
//!      verdict grades as incorrect with an evaluation-error message.
//!
//! 4. **Persistence**: one UPDATE stores the canonical answer map (list
//!    answers re-encoded as JSON arrays), the feedback list, the point
//!    totals, and `completed = 1`. Resubmitting overwrites all of it.

use actix_web::{web, HttpResponse};
use log::info;
use rusqlite::{params, Connection};
use serde_json::json;

use common::generation::{AnswerValue, EssayEvaluation};
use common::model::assignment::{AnswerFeedback, Question, QuestionType};
use common::requests::SubmitAssignmentRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::session::AuthedUser;

const CORRECT_THRESHOLD: f64 = 0.7;

const EVALUATION_ERROR_FEEDBACK: &str = "Error evaluating answer. Please try again.";

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    path: web::Path<i64>,
    payload: web::Json<SubmitAssignmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let assignment_id = path.into_inner();
    let assignment = db::get_assignment(&conn, assignment_id)?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;
    if assignment.user_id != user.id {
        return Err(ApiError::AuthorizationDenied);
    }

    let request = payload.into_inner();
    let resolved = resolve_questions(&conn, assignment.id, &request)?;

    let client = LlmClient::new(&cfg);
    let mut total_points: i64 = 0;
    let mut earned_points: i64 = 0;
    let mut feedback: Vec<AnswerFeedback> = Vec::new();
    let mut canonical = serde_json::Map::new();

    for (key, question, answer) in &resolved {
        let graded = grade_answer(&client, question, answer).await;

        if graded.is_correct {
            earned_points += question.points;
        }
        total_points += question.points;
        canonical.insert(key.clone(), graded.canonical_answer);
        feedback.push(AnswerFeedback {
            question_id: key.clone(),
            is_correct: graded.is_correct,
            feedback: graded.feedback,
        });
    }

    persist_submission(
        &conn,
        assignment.id,
        &serde_json::Value::Object(canonical).to_string(),
        &serde_json::to_string(&feedback)
            .map_err(|e| ApiError::Internal(format!("feedback encoding: {}", e)))?,
        total_points,
        earned_points,
    )?;
    info!(
        "assignment {} submitted: {}/{} points",
        assignment.id, earned_points, total_points
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Assignment submitted successfully",
        "total_points": total_points,
        "earned_points": earned_points,
        "feedback": feedback,
    })))
}

/// Map every answer key to its question up front. Unknown ids, keys that do
/// not parse, and questions from other assignments all fail validation here,
/// before anything is graded or written.
fn resolve_questions(
    conn: &Connection,
    assignment_id: i64,
    request: &SubmitAssignmentRequest,
) -> Result<Vec<(String, Question, AnswerValue)>, ApiError> {
    let mut resolved = Vec::with_capacity(request.answers.len());
    for (key, answer) in &request.answers {
        let id: i64 = key
            .trim_start_matches('q')
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid question key: {}", key)))?;
        let question = db::get_question(conn, id)?
            .filter(|q| q.assignment_id == assignment_id)
            .ok_or_else(|| {
                ApiError::Validation(format!("Unknown question for this assignment: {}", key))
            })?;
        resolved.push((key.clone(), question, answer.clone()));
    }
    Ok(resolved)
}

struct GradedAnswer {
    is_correct: bool,
    feedback: String,
    /// What gets persisted in the answer map: a JSON array for sequence
    /// answers, a JSON string otherwise.
    canonical_answer: serde_json::Value,
}

async fn grade_answer(client: &LlmClient, question: &Question, answer: &AnswerValue) -> GradedAnswer {
    match question.question_type {
        QuestionType::MultipleChoice => {
            let submitted = answer_text(answer);
            GradedAnswer {
                is_correct: grade_exact(&submitted, &question.correct_answer),
                feedback: String::new(),
                canonical_answer: json!(submitted),
            }
        }
        QuestionType::FillBlank => {
            let submitted = answer_text(answer);
            GradedAnswer {
                is_correct: grade_case_insensitive(&submitted, &question.correct_answer),
                feedback: String::new(),
                canonical_answer: json!(submitted),
            }
        }
        QuestionType::Ordering | QuestionType::DragDrop => grade_sequence(question, answer),
        QuestionType::ShortAnswer | QuestionType::LongAnswer => {
            let submitted = answer_text(answer);
            let (is_correct, feedback) = grade_essay(client, question, &submitted).await;
            GradedAnswer {
                is_correct,
                feedback,
                canonical_answer: json!(submitted),
            }
        }
    }
}

/// Flatten a submitted value to text for the string-compared types. A list
/// where text was expected never matches, but is still recorded.
fn answer_text(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::List(items) => items.join("\n"),
    }
}

fn grade_exact(submitted: &str, correct: &str) -> bool {
    submitted.trim() == correct.trim()
}

fn grade_case_insensitive(submitted: &str, correct: &str) -> bool {
    submitted.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// Decode a submitted sequence: either a real list, or a JSON-encoded
/// string of one (how some form serializers deliver it).
fn decode_sequence(answer: &AnswerValue) -> Option<Vec<String>> {
    match answer {
        AnswerValue::List(items) => Some(items.clone()),
        AnswerValue::Text(text) => serde_json::from_str(text).ok(),
    }
}

fn grade_sequence(question: &Question, answer: &AnswerValue) -> GradedAnswer {
    let correct: Option<Vec<String>> = serde_json::from_str(&question.correct_answer).ok();
    let submitted = decode_sequence(answer);

    match (submitted, correct) {
        (Some(submitted), Some(correct)) => GradedAnswer {
            is_correct: submitted == correct,
            feedback: String::new(),
            canonical_answer: json!(submitted),
        },
        // Either side undecodable: record the raw submission, grade wrong.
        (submitted, _) => GradedAnswer {
            is_correct: false,
            feedback: String::new(),
            canonical_answer: submitted
                .map(|s| json!(s))
                .unwrap_or_else(|| json!(answer_text(answer))),
        },
    }
}

async fn grade_essay(client: &LlmClient, question: &Question, submitted: &str) -> (bool, String) {
    let system = format!(
        r#"You are evaluating a {} answer.
Evaluate how well the student answer matches the expected answer.

IMPORTANT: You must respond with ONLY a valid JSON object in the following format:
{{
  "score": 0.85,
  "feedback": "Your feedback to the student here"
}}

score is a number between 0 and 1 representing how correct the answer is.
Do not include any text before or after the JSON object."#,
        question.question_type.as_str()
    );
    let user = format!(
        "Question: {}\nCorrect Answer: {}\nStudent Answer: {}",
        question.question_text, question.correct_answer, submitted
    );

    match client.chat_json(&system, &user).await {
        Ok(raw) => essay_verdict(&raw),
        Err(_) => (false, EVALUATION_ERROR_FEEDBACK.to_string()),
    }
}

/// Parse the model's `{score, feedback}` verdict. Anything unparseable is
/// an incorrect answer with an evaluation-error message.
fn essay_verdict(raw: &str) -> (bool, String) {
    match serde_json::from_str::<EssayEvaluation>(raw) {
        Ok(eval) => {
            let score = eval.score.clamp(0.0, 1.0);
            (score >= CORRECT_THRESHOLD, eval.feedback)
        }
        Err(_) => (false, EVALUATION_ERROR_FEEDBACK.to_string()),
    }
}

/// The single mutation of an assignment row. Called exactly once per
/// submission; a later submission replaces everything stored here.
fn persist_submission(
    conn: &Connection,
    assignment_id: i64,
    answers_json: &str,
    feedback_json: &str,
    total_points: i64,
    earned_points: i64,
) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE assignments
         SET student_answers = ?1, ai_feedback = ?2, completed = 1,
             total_points = ?3, earned_points = ?4
         WHERE id = ?5",
        params![answers_json, feedback_json, total_points, earned_points, assignment_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(question_type: QuestionType, correct_answer: &str, points: i64) -> Question {
        Question {
            id: 1,
            assignment_id: 1,
            question_type,
            question_text: "q".to_string(),
            options: None,
            correct_answer: correct_answer.to_string(),
            points,
            ord: 0,
            topic: String::new(),
            subtopic: String::new(),
            explanation: String::new(),
        }
    }

    #[test]
    fn multiple_choice_is_trimmed_but_case_sensitive() {
        assert!(grade_exact("Paris", "Paris"));
        assert!(grade_exact("  Paris ", "Paris"));
        assert!(!grade_exact(" paris ", "Paris"));
        assert!(!grade_exact("Lyon", "Paris"));
    }

    #[test]
    fn fill_blank_ignores_case_and_whitespace() {
        assert!(grade_case_insensitive(" paris ", "Paris"));
        assert!(grade_case_insensitive("PARIS", "paris"));
        assert!(!grade_case_insensitive("Lyon", "Paris"));
    }

    #[test]
    fn sequences_require_exact_order() {
        let q = question(QuestionType::Ordering, r#"["A","B","C"]"#, 2);

        let right = grade_sequence(
            &q,
            &AnswerValue::List(vec!["A".into(), "B".into(), "C".into()]),
        );
        assert!(right.is_correct);
        assert_eq!(right.canonical_answer, json!(["A", "B", "C"]));

        let wrong = grade_sequence(
            &q,
            &AnswerValue::List(vec!["B".into(), "A".into(), "C".into()]),
        );
        assert!(!wrong.is_correct);
    }

    #[test]
    fn sequence_submitted_as_json_string_is_decoded() {
        let q = question(QuestionType::DragDrop, r#"["A","B"]"#, 2);
        let graded = grade_sequence(&q, &AnswerValue::Text(r#"["A","B"]"#.to_string()));
        assert!(graded.is_correct);
        // Canonical form is a JSON array, not the encoded string.
        assert_eq!(graded.canonical_answer, json!(["A", "B"]));
    }

    #[test]
    fn undecodable_sequence_grades_wrong_without_erroring() {
        let q = question(QuestionType::Ordering, r#"["A","B"]"#, 2);
        let graded = grade_sequence(&q, &AnswerValue::Text("A then B".to_string()));
        assert!(!graded.is_correct);
        assert_eq!(graded.canonical_answer, json!("A then B"));
    }

    #[test]
    fn essay_verdict_applies_the_threshold() {
        assert_eq!(
            essay_verdict(r#"{"score": 0.85, "feedback": "good"}"#),
            (true, "good".to_string())
        );
        assert_eq!(
            essay_verdict(r#"{"score": 0.7, "feedback": ""}"#).0,
            true
        );
        assert_eq!(
            essay_verdict(r#"{"score": 0.69, "feedback": "almost"}"#).0,
            false
        );
        // Out-of-range scores are clamped before comparing.
        assert_eq!(essay_verdict(r#"{"score": 3.5, "feedback": ""}"#).0, true);
    }

    #[test]
    fn unparseable_essay_verdict_is_incorrect_with_error_feedback() {
        let (correct, feedback) = essay_verdict("I think this deserves a B+");
        assert!(!correct);
        assert_eq!(feedback, EVALUATION_ERROR_FEEDBACK);
    }

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (username, email, password_hash, created_at)
               VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z');
             INSERT INTO syllabi (user_id, title, content, created_at)
               VALUES (1, 's', 'c', '2026-01-01T00:00:00Z');
             INSERT INTO assignments (user_id, syllabus_id, title, description, due_date)
               VALUES (1, 1, 'a', 'd', '2026-01-08T00:00:00Z');
             INSERT INTO questions (assignment_id, question_type, question_text, correct_answer, points)
               VALUES (1, 'fill_blank', 'Capital of France?', 'Paris', 1);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn resubmission_overwrites_stored_results() {
        let conn = seeded_conn();

        persist_submission(&conn, 1, r#"{"q1":"paris"}"#, r#"[]"#, 1, 1).unwrap();
        persist_submission(&conn, 1, r#"{"q1":"Lyon"}"#, r#"[]"#, 1, 0).unwrap();

        let assignment = crate::db::get_assignment(&conn, 1).unwrap().unwrap();
        assert!(assignment.completed);
        assert_eq!(assignment.student_answers.as_deref(), Some(r#"{"q1":"Lyon"}"#));
        assert_eq!(assignment.earned_points, 0);
        assert_eq!(assignment.total_points, 1);
    }

    #[test]
    fn unknown_question_key_rejects_the_submission() {
        let conn = seeded_conn();
        let request: SubmitAssignmentRequest =
            serde_json::from_str(r#"{"answers": {"q999": "Paris"}}"#).unwrap();

        let err = resolve_questions(&conn, 1, &request).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Nothing was graded, so nothing may have been written.
        let assignment = crate::db::get_assignment(&conn, 1).unwrap().unwrap();
        assert!(!assignment.completed);
        assert!(assignment.student_answers.is_none());
    }

    #[test]
    fn question_from_another_assignment_is_rejected() {
        let conn = seeded_conn();
        conn.execute_batch(
            "INSERT INTO assignments (user_id, syllabus_id, title, description, due_date)
               VALUES (1, 1, 'other', 'd', '2026-01-08T00:00:00Z');
             INSERT INTO questions (assignment_id, question_type, question_text, correct_answer)
               VALUES (2, 'fill_blank', 'q', 'x');",
        )
        .unwrap();

        let request: SubmitAssignmentRequest =
            serde_json::from_str(r#"{"answers": {"q2": "x"}}"#).unwrap();
        let err = resolve_questions(&conn, 1, &request).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
