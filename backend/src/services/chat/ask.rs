use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use common::requests::ChatRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::session::{self, AuthedUser};
use crate::views;

const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful educational assistant. Provide clear, concise explanations.";

pub async fn page(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    if session::page_user(&req, &conn)?.is_none() {
        return Ok(views::redirect("/login"));
    }
    let html = views::render_page("chat.html", &[])?;
    Ok(views::page(html))
}

/// Free-form Q&A proxy: one user message in, one assistant message out.
pub async fn process(
    cfg: web::Data<Config>,
    _user: AuthedUser,
    payload: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = LlmClient::new(&cfg);
    let answer = client.chat(CHAT_SYSTEM_PROMPT, &payload.message).await?;
    Ok(HttpResponse::Ok().json(json!({ "response": answer })))
}
