use actix_web::{web, HttpRequest, HttpResponse};

use common::model::assignment::Assignment;
use common::model::note::Note;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html, markdown_to_html};

pub async fn process(
    cfg: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let syllabus = match db::get_syllabus(&conn, path.into_inner())? {
        Some(s) => s,
        None => return Ok(views::redirect_with_flash("/syllabi", "Syllabus not found")),
    };
    if syllabus.user_id != user.id {
        return Ok(views::redirect_with_flash("/syllabi", "Unauthorized access"));
    }

    let notes = db::notes_for_syllabus(&conn, syllabus.id)?;
    let assignments = db::assignments_for_syllabus(&conn, syllabus.id)?;

    let download = if syllabus.file_path.is_some() {
        format!(
            r#"<a class="button" href="/syllabi/{}/download">Download PDF</a>"#,
            syllabus.id
        )
    } else {
        String::new()
    };

    let flash = views::take_flash(&req);
    let html = views::render_page(
        "view_syllabus.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("syllabus_id", syllabus.id.to_string()),
            ("title", escape_html(&syllabus.title)),
            ("content", escape_html(&syllabus.content)),
            ("download_link", download),
            ("notes", note_sections(&notes)),
            ("assignments", assignment_items(&assignments)),
        ],
    )?;
    Ok(views::page(html))
}

/// Notes are stored as markdown and rendered to HTML here, one section per
/// note in generation order.
fn note_sections(notes: &[Note]) -> String {
    if notes.is_empty() {
        return r#"<p class="empty">No notes yet. Generate some from this syllabus.</p>"#
            .to_string();
    }
    notes
        .iter()
        .map(|n| {
            format!(
                r#"<section class="note"><h3>{}</h3><div class="note-body">{}</div></section>"#,
                escape_html(&n.title),
                markdown_to_html(&n.content)
            )
        })
        .collect()
}

fn assignment_items(assignments: &[Assignment]) -> String {
    if assignments.is_empty() {
        return r#"<p class="empty">No assignments yet.</p>"#.to_string();
    }
    let items: String = assignments
        .iter()
        .map(|a| {
            format!(
                r#"<li><a href="/assignments/{}">{}</a> <span class="due">due {}</span></li>"#,
                a.id,
                escape_html(&a.title),
                a.due_date.format("%Y-%m-%d")
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
