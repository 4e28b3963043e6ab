//! SQLite access layer.
//!
//! The schema is created idempotently at startup; handlers open a short-lived
//! connection per request against the configured database path. Relationship
//! traversal is explicit: every lookup goes through a query on a foreign key,
//! there are no implicit back-references.

use actix_web::web;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use common::model::assignment::{Assignment, Question, QuestionType};
use common::model::note::Note;
use common::model::study_plan::StudyPlan;
use common::model::syllabus::Syllabus;
use common::model::todo::Todo;

use crate::config::Config;
use crate::error::ApiError;

/// Open a connection to the configured database with foreign keys enforced.
pub fn open(cfg: &web::Data<Config>) -> Result<Connection, ApiError> {
    let conn = Connection::open(&cfg.database_path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Create all tables if they do not exist yet. Called once from `main`.
pub fn init(path: &str) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    init_schema(&conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        );
        CREATE TABLE IF NOT EXISTS syllabi (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            file_path TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        );
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            syllabus_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            topic TEXT NOT NULL,
            subtopic TEXT NOT NULL,
            ord INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(syllabus_id) REFERENCES syllabi(id)
        );
        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            syllabus_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            due_date TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            student_answers TEXT,
            ai_feedback TEXT,
            total_points INTEGER NOT NULL DEFAULT 0,
            earned_points INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(syllabus_id) REFERENCES syllabi(id)
        );
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id INTEGER NOT NULL,
            question_type TEXT NOT NULL,
            question_text TEXT NOT NULL,
            options TEXT,
            correct_answer TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 1,
            ord INTEGER NOT NULL DEFAULT 0,
            topic TEXT NOT NULL DEFAULT '',
            subtopic TEXT NOT NULL DEFAULT '',
            explanation TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(assignment_id) REFERENCES assignments(id)
        );
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            due_date TEXT,
            priority INTEGER NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        );
        CREATE TABLE IF NOT EXISTS study_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        );
        COMMIT;",
    )
}

fn syllabus_from_row(row: &Row) -> rusqlite::Result<Syllabus> {
    Ok(Syllabus {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        file_path: row.get(4)?,
        created_at: row.get::<_, DateTime<Utc>>(5)?,
    })
}

const SYLLABUS_COLS: &str = "id, user_id, title, content, file_path, created_at";

pub fn get_syllabus(conn: &Connection, id: i64) -> rusqlite::Result<Option<Syllabus>> {
    conn.query_row(
        &format!("SELECT {} FROM syllabi WHERE id = ?1", SYLLABUS_COLS),
        params![id],
        syllabus_from_row,
    )
    .optional()
}

pub fn syllabi_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Syllabus>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM syllabi WHERE user_id = ?1 ORDER BY created_at DESC",
        SYLLABUS_COLS
    ))?;
    let rows = stmt.query_map(params![user_id], syllabus_from_row)?;
    rows.collect()
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        syllabus_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        topic: row.get(4)?,
        subtopic: row.get(5)?,
        ord: row.get(6)?,
        created_at: row.get::<_, DateTime<Utc>>(7)?,
    })
}

pub fn notes_for_syllabus(conn: &Connection, syllabus_id: i64) -> rusqlite::Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, syllabus_id, title, content, topic, subtopic, ord, created_at
         FROM notes WHERE syllabus_id = ?1 ORDER BY ord",
    )?;
    let rows = stmt.query_map(params![syllabus_id], note_from_row)?;
    rows.collect()
}

fn assignment_from_row(row: &Row) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        syllabus_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        due_date: row.get::<_, DateTime<Utc>>(5)?,
        completed: row.get(6)?,
        student_answers: row.get(7)?,
        ai_feedback: row.get(8)?,
        total_points: row.get(9)?,
        earned_points: row.get(10)?,
    })
}

const ASSIGNMENT_COLS: &str = "id, user_id, syllabus_id, title, description, due_date, \
     completed, student_answers, ai_feedback, total_points, earned_points";

pub fn get_assignment(conn: &Connection, id: i64) -> rusqlite::Result<Option<Assignment>> {
    conn.query_row(
        &format!("SELECT {} FROM assignments WHERE id = ?1", ASSIGNMENT_COLS),
        params![id],
        assignment_from_row,
    )
    .optional()
}

pub fn assignments_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Assignment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assignments WHERE user_id = ?1 ORDER BY due_date DESC",
        ASSIGNMENT_COLS
    ))?;
    let rows = stmt.query_map(params![user_id], assignment_from_row)?;
    rows.collect()
}

pub fn assignments_for_syllabus(
    conn: &Connection,
    syllabus_id: i64,
) -> rusqlite::Result<Vec<Assignment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assignments WHERE syllabus_id = ?1 ORDER BY due_date DESC",
        ASSIGNMENT_COLS
    ))?;
    let rows = stmt.query_map(params![syllabus_id], assignment_from_row)?;
    rows.collect()
}

fn question_from_row(row: &Row) -> rusqlite::Result<Question> {
    let type_text: String = row.get(2)?;
    let question_type = QuestionType::from_str(&type_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown question type: {}", type_text).into(),
        )
    })?;
    let options_text: Option<String> = row.get(4)?;
    let options = match options_text {
        Some(text) => Some(serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(Question {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        question_type,
        question_text: row.get(3)?,
        options,
        correct_answer: row.get(5)?,
        points: row.get(6)?,
        ord: row.get(7)?,
        topic: row.get(8)?,
        subtopic: row.get(9)?,
        explanation: row.get(10)?,
    })
}

const QUESTION_COLS: &str = "id, assignment_id, question_type, question_text, options, \
     correct_answer, points, ord, topic, subtopic, explanation";

pub fn get_question(conn: &Connection, id: i64) -> rusqlite::Result<Option<Question>> {
    conn.query_row(
        &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLS),
        params![id],
        question_from_row,
    )
    .optional()
}

pub fn questions_for_assignment(
    conn: &Connection,
    assignment_id: i64,
) -> rusqlite::Result<Vec<Question>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM questions WHERE assignment_id = ?1 ORDER BY ord",
        QUESTION_COLS
    ))?;
    let rows = stmt.query_map(params![assignment_id], question_from_row)?;
    rows.collect()
}

fn todo_from_row(row: &Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: row.get::<_, Option<DateTime<Utc>>>(4)?,
        priority: row.get(5)?,
        completed: row.get(6)?,
        created_at: row.get::<_, DateTime<Utc>>(7)?,
    })
}

const TODO_COLS: &str = "id, user_id, title, description, due_date, priority, completed, created_at";

pub fn get_todo(conn: &Connection, id: i64) -> rusqlite::Result<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLS),
        params![id],
        todo_from_row,
    )
    .optional()
}

/// Todos sorted the way the list page shows them: high priority first,
/// earliest due date within a priority band.
pub fn todos_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM todos WHERE user_id = ?1 ORDER BY priority DESC, due_date",
        TODO_COLS
    ))?;
    let rows = stmt.query_map(params![user_id], todo_from_row)?;
    rows.collect()
}

pub fn open_todos_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM todos WHERE user_id = ?1 AND completed = 0 ORDER BY priority DESC, due_date",
        TODO_COLS
    ))?;
    let rows = stmt.query_map(params![user_id], todo_from_row)?;
    rows.collect()
}

fn plan_from_row(row: &Row) -> rusqlite::Result<StudyPlan> {
    Ok(StudyPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        start_date: row.get::<_, DateTime<Utc>>(3)?,
        end_date: row.get::<_, DateTime<Utc>>(4)?,
        content: row.get(5)?,
        created_at: row.get::<_, DateTime<Utc>>(6)?,
    })
}

const PLAN_COLS: &str = "id, user_id, title, start_date, end_date, content, created_at";

pub fn get_study_plan(conn: &Connection, id: i64) -> rusqlite::Result<Option<StudyPlan>> {
    conn.query_row(
        &format!("SELECT {} FROM study_plans WHERE id = ?1", PLAN_COLS),
        params![id],
        plan_from_row,
    )
    .optional()
}

pub fn study_plans_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<StudyPlan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM study_plans WHERE user_id = ?1 ORDER BY created_at DESC",
        PLAN_COLS
    ))?;
    let rows = stmt.query_map(params![user_id], plan_from_row)?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn init_creates_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.sqlite");
        init(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
        // A second init against the existing file is a no-op.
        init(path.to_str().unwrap()).unwrap();
    }

    #[test]
    fn question_round_trip_preserves_type_and_options() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO syllabi (user_id, title, content, created_at)
             VALUES (1, 's', 'c', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO assignments (user_id, syllabus_id, title, description, due_date)
             VALUES (1, 1, 'a', 'd', '2026-01-08T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO questions (assignment_id, question_type, question_text, options,
                 correct_answer, points, ord)
             VALUES (1, 'ordering', 'Arrange:', '[\"A\",\"B\"]', '[\"A\",\"B\"]', 2, 0)",
            [],
        )
        .unwrap();

        let q = get_question(&conn, 1).unwrap().unwrap();
        assert_eq!(q.question_type, QuestionType::Ordering);
        assert_eq!(q.options, Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(q.correct_answer, "[\"A\",\"B\"]");
    }
}
