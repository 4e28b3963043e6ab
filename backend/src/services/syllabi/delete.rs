use std::fs;

use actix_web::{web, HttpResponse};
use log::warn;
use rusqlite::{params, Connection};
use serde_json::json;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::AuthedUser;

/// Delete a syllabus and everything hanging off it: notes, assignments and
/// their questions, all in one transaction. The stored PDF is removed
/// afterwards, best-effort.
pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let mut conn = db::open(&cfg)?;
    let syllabus = db::get_syllabus(&conn, path.into_inner())?
        .ok_or_else(|| ApiError::NotFound("Syllabus not found".to_string()))?;
    if syllabus.user_id != user.id {
        return Err(ApiError::AuthorizationDenied);
    }

    delete_syllabus_rows(&mut conn, syllabus.id)?;

    if let Some(file_path) = syllabus.file_path {
        if let Err(e) = fs::remove_file(&file_path) {
            warn!("could not remove syllabus file {}: {}", file_path, e);
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Syllabus deleted successfully" })))
}

fn delete_syllabus_rows(conn: &mut Connection, syllabus_id: i64) -> Result<(), ApiError> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM questions WHERE assignment_id IN
             (SELECT id FROM assignments WHERE syllabus_id = ?1)",
        params![syllabus_id],
    )?;
    tx.execute(
        "DELETE FROM assignments WHERE syllabus_id = ?1",
        params![syllabus_id],
    )?;
    tx.execute("DELETE FROM notes WHERE syllabus_id = ?1", params![syllabus_id])?;
    tx.execute("DELETE FROM syllabi WHERE id = ?1", params![syllabus_id])?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(conn: &Connection) {
        crate::db::init_schema(conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (username, email, password_hash, created_at)
               VALUES ('a', 'a@b.c', 'x', '2026-01-01T00:00:00Z');
             INSERT INTO syllabi (user_id, title, content, created_at)
               VALUES (1, 'kept', 'c', '2026-01-01T00:00:00Z');
             INSERT INTO syllabi (user_id, title, content, created_at)
               VALUES (1, 'doomed', 'c', '2026-01-01T00:00:00Z');
             INSERT INTO notes (syllabus_id, title, content, topic, subtopic, ord, created_at)
               VALUES (2, 'n', 'c', 't', 's', 0, '2026-01-01T00:00:00Z');
             INSERT INTO assignments (user_id, syllabus_id, title, description, due_date)
               VALUES (1, 2, 'a', 'd', '2026-01-08T00:00:00Z');
             INSERT INTO questions (assignment_id, question_type, question_text, correct_answer)
               VALUES (1, 'fill_blank', 'q', 'Paris');
             INSERT INTO notes (syllabus_id, title, content, topic, subtopic, ord, created_at)
               VALUES (1, 'other', 'c', 't', 's', 0, '2026-01-01T00:00:00Z');",
        )
        .unwrap();
    }

    #[test]
    fn cascade_leaves_no_orphans_and_spares_other_syllabi() {
        let mut conn = Connection::open_in_memory().unwrap();
        seed(&conn);

        delete_syllabus_rows(&mut conn, 2).unwrap();

        let count = |sql: &str| -> i64 { conn.query_row(sql, [], |r| r.get(0)).unwrap() };
        assert_eq!(count("SELECT COUNT(*) FROM syllabi WHERE id = 2"), 0);
        assert_eq!(count("SELECT COUNT(*) FROM notes WHERE syllabus_id = 2"), 0);
        assert_eq!(count("SELECT COUNT(*) FROM assignments WHERE syllabus_id = 2"), 0);
        assert_eq!(count("SELECT COUNT(*) FROM questions"), 0);
        // The unrelated syllabus and its note survive.
        assert_eq!(count("SELECT COUNT(*) FROM syllabi"), 1);
        assert_eq!(count("SELECT COUNT(*) FROM notes"), 1);
    }
}
