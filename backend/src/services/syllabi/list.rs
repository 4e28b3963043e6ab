use actix_web::{web, HttpRequest, HttpResponse};

use common::model::syllabus::Syllabus;

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

    let syllabi = db::syllabi_for_user(&conn, user.id)?;
    let flash = views::take_flash(&req);
    let html = views::render_page(
        "syllabi.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("syllabi", syllabus_items(&syllabi)),
        ],
    )?;
    Ok(views::page(html))
}

fn syllabus_items(syllabi: &[Syllabus]) -> String {
    if syllabi.is_empty() {
        return r#"<p class="empty">No syllabi yet. Upload a PDF or paste course text to get started.</p>"#
            .to_string();
    }
    let items: String = syllabi
        .iter()
        .map(|s| {
            let pdf_badge = if s.file_path.is_some() {
                r#" <span class="badge">PDF</span>"#
            } else {
                ""
            };
            format!(
                r#"<li><a href="/syllabi/{}">{}</a>{} <span class="due">added {}</span></li>"#,
                s.id,
                escape_html(&s.title),
                pdf_badge,
                s.created_at.format("%Y-%m-%d")
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
