use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::params;
use serde_json::json;

use common::requests::CreateTodoRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::AuthedUser;
use crate::util::parse_datetime;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    payload: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    if data.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    let priority = data.priority.unwrap_or(0);
    if !(0..=2).contains(&priority) {
        return Err(ApiError::Validation("Priority must be 0, 1 or 2".to_string()));
    }
    let due_date = match data.due_date.as_deref() {
        Some(s) => Some(parse_datetime(s)?),
        None => None,
    };

    let conn = db::open(&cfg)?;
    conn.execute(
        "INSERT INTO todos (user_id, title, description, due_date, priority, completed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            user.id,
            data.title,
            data.description.unwrap_or_default(),
            due_date,
            priority,
            Utc::now(),
        ],
    )?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Todo created successfully",
        "id": conn.last_insert_rowid(),
    })))
}
