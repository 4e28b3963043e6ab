use actix_web::{web, HttpRequest, HttpResponse};

use common::model::assignment::Assignment;
use common::model::todo::Todo;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html};

pub async fn process(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let assignments = db::assignments_for_user(&conn, user.id)?;
    let todos = db::todos_for_user(&conn, user.id)?;

    // Recent activity: the five assignments with the latest due dates.
    let recent: Vec<&Assignment> = assignments.iter().take(5).collect();

    let flash = views::take_flash(&req);
    let html = views::render_page(
        "dashboard.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("username", escape_html(&user.username)),
            ("assignment_count", assignments.len().to_string()),
            (
                "completed_count",
                assignments.iter().filter(|a| a.completed).count().to_string(),
            ),
            ("todo_count", todos.iter().filter(|t| !t.completed).count().to_string()),
            ("recent_assignments", assignment_items(&recent)),
            ("todos", todo_items(&todos)),
        ],
    )?;
    Ok(views::page(html))
}

fn assignment_items(assignments: &[&Assignment]) -> String {
    if assignments.is_empty() {
        return r#"<p class="empty">No assignments yet.</p>"#.to_string();
    }
    let items: String = assignments
        .iter()
        .map(|a| {
            let status = if a.completed {
                format!(
                    r#" <span class="score">{}/{}</span>"#,
                    a.earned_points, a.total_points
                )
            } else {
                String::new()
            };
            format!(
                r#"<li><a href="/assignments/{}">{}</a> <span class="due">due {}</span>{}</li>"#,
                a.id,
                escape_html(&a.title),
                a.due_date.format("%Y-%m-%d"),
                status
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}

fn todo_items(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return r#"<p class="empty">No todos yet.</p>"#.to_string();
    }
    let items: String = todos
        .iter()
        .filter(|t| !t.completed)
        .map(|t| {
            let due = t
                .due_date
                .map(|d| format!(r#" <span class="due">due {}</span>"#, d.format("%Y-%m-%d")))
                .unwrap_or_default();
            format!(
                r#"<li class="priority-{}">{}{}</li>"#,
                t.priority,
                escape_html(&t.title),
                due
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
