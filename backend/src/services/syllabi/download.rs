use std::path::Path;

use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views;

/// Serve the stored PDF as an attachment. Text-only syllabi (or a file that
/// has gone missing on disk) flash an error back to the detail page.
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

    match syllabus.file_path.as_deref().filter(|p| Path::new(p).exists()) {
        Some(file_path) => {
            let file = NamedFile::open(file_path)?;
            Ok(file.into_response(&req))
        }
        None => Ok(views::redirect_with_flash(
            &format!("/syllabi/{}", syllabus.id),
            "File not found",
        )),
    }
}
