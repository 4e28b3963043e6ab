use actix_web::{web, HttpRequest, HttpResponse};

use common::model::todo::Todo;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html};

const PRIORITY_LABELS: [&str; 3] = ["Low", "Medium", "High"];

pub async fn process(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let todos = db::todos_for_user(&conn, user.id)?;
    let flash = views::take_flash(&req);
    let html = views::render_page(
        "todos.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("todos", todo_items(&todos)),
        ],
    )?;
    Ok(views::page(html))
}

fn todo_items(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return r#"<p class="empty">No todos yet.</p>"#.to_string();
    }
    let items: String = todos
        .iter()
        .map(|t| {
            let priority = PRIORITY_LABELS
                .get(t.priority.max(0) as usize)
                .unwrap_or(&"Low");
            let due = t
                .due_date
                .map(|d| format!(r#" <span class="due">due {}</span>"#, d.format("%Y-%m-%d")))
                .unwrap_or_default();
            let done = if t.completed { " done" } else { "" };
            format!(
                r#"<li class="todo priority-{}{}" data-id="{}"><input type="checkbox" class="toggle"{}> <strong>{}</strong> <span class="badge">{}</span>{} <button type="button" class="delete">&times;</button></li>"#,
                t.priority,
                done,
                t.id,
                if t.completed { " checked" } else { "" },
                escape_html(&t.title),
                priority,
                due
            )
        })
        .collect();
    format!(r#"<ul id="todo-list">{}</ul>"#, items)
}
