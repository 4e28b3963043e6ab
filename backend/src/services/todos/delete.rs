use actix_web::{web, HttpResponse};
use rusqlite::params;
use serde_json::json;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::AuthedUser;

pub async fn process(
    cfg: web::Data<Config>,
    user: AuthedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let todo = db::get_todo(&conn, path.into_inner())?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;
    if todo.user_id != user.id {
        return Err(ApiError::AuthorizationDenied);
    }

    conn.execute("DELETE FROM todos WHERE id = ?1", params![todo.id])?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Todo deleted successfully" })))
}
