use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use common::model::assignment::Assignment;

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
    let flash = views::take_flash(&req);
    let html = views::render_page(
        "assignments.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("assignments", assignment_items(&assignments)),
        ],
    )?;
    Ok(views::page(html))
}

fn assignment_items(assignments: &[Assignment]) -> String {
    if assignments.is_empty() {
        return r#"<p class="empty">No assignments yet. Generate one from a syllabus.</p>"#
            .to_string();
    }
    let now = Utc::now();
    let items: String = assignments
        .iter()
        .map(|a| {
            let status = if a.completed {
                format!(
                    r#"<span class="score">{}/{}</span>"#,
                    a.earned_points, a.total_points
                )
            } else if a.due_date < now {
                r#"<span class="overdue">overdue</span>"#.to_string()
            } else {
                r#"<span class="open">open</span>"#.to_string()
            };
            format!(
                r#"<li><a href="/assignments/{}">{}</a> <span class="due">due {}</span> {}</li>"#,
                a.id,
                escape_html(&a.title),
                a.due_date.format("%Y-%m-%d"),
                status
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
