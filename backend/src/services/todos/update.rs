use actix_web::{web, HttpResponse};
use rusqlite::{params, Connection};
use serde_json::json;

use common::model::todo::Todo;
use common::requests::UpdateTodoRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::AuthedUser;
use crate::util::parse_datetime;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    path: web::Path<i64>,
    payload: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let todo = db::get_todo(&conn, path.into_inner())?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
    if todo.user_id != user.id {
        return Err(ApiError::AuthorizationDenied);
    }

    let updated = apply_update(todo, payload.into_inner())?;
    store(&conn, &updated)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Todo updated successfully" })))
}

/// Field-by-field partial update: only the fields present in the request
/// change, everything else keeps its stored value.
fn apply_update(mut todo: Todo, data: UpdateTodoRequest) -> Result<Todo, ApiError> {
    if let Some(title) = data.title {
        todo.title = title;
    }
    if let Some(description) = data.description {
        todo.description = description;
    }
    if let Some(due_date) = data.due_date.as_deref() {
        todo.due_date = Some(parse_datetime(due_date)?);
    }
    if let Some(priority) = data.priority {
        if !(0..=2).contains(&priority) {
            return Err(ApiError::Validation("Priority must be 0, 1 or 2".to_string()));
        }
        todo.priority = priority;
    }
    if let Some(completed) = data.completed {
        todo.completed = completed;
    }
    Ok(todo)
}

fn store(conn: &Connection, todo: &Todo) -> Result<(), ApiError> {
    conn.execute(
        "UPDATE todos SET title = ?1, description = ?2, due_date = ?3, priority = ?4,
             completed = ?5 WHERE id = ?6",
        params![
            todo.title,
            todo.description,
            todo.due_date,
            todo.priority,
            todo.completed,
            todo.id
        ],
    )?;
    Ok(())
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
             INSERT INTO todos (user_id, title, description, due_date, priority, completed, created_at)
               VALUES (1, 'Read chapter 3', 'pages 40-60', '2026-02-01T00:00:00Z', 1, 0,
                       '2026-01-01T00:00:00Z');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn partial_update_touches_only_named_fields() {
        let conn = seeded_conn();
        let todo = crate::db::get_todo(&conn, 1).unwrap().unwrap();

        let data: UpdateTodoRequest =
            serde_json::from_str(r#"{"completed": true}"#).unwrap();
        let updated = apply_update(todo, data).unwrap();
        store(&conn, &updated).unwrap();

        let stored = crate::db::get_todo(&conn, 1).unwrap().unwrap();
        assert!(stored.completed);
        assert_eq!(stored.title, "Read chapter 3");
        assert_eq!(stored.description, "pages 40-60");
        assert_eq!(stored.priority, 1);
        assert!(stored.due_date.is_some());
    }

    #[test]
    fn bad_priority_and_bad_date_are_validation_failures() {
        let conn = seeded_conn();
        let todo = crate::db::get_todo(&conn, 1).unwrap().unwrap();

        let data: UpdateTodoRequest = serde_json::from_str(r#"{"priority": 9}"#).unwrap();
        assert!(matches!(
            apply_update(todo.clone(), data),
            Err(ApiError::Validation(_))
        ));

        let data: UpdateTodoRequest =
            serde_json::from_str(r#"{"due_date": "whenever"}"#).unwrap();
        assert!(matches!(apply_update(todo, data), Err(ApiError::Validation(_))));
    }
}
