//! Syllabus management: the listing page, creation by PDF upload or raw
//! text, the detail page with generated notes, the stored-PDF download, and
//! deletion with its full cascade.

mod create;
mod delete;
mod download;
mod list;
mod view;

use actix_web::guard::{self, GuardContext};
use actix_web::http::header;
use actix_web::web;
use actix_web::Scope;

/// PDF uploads come in as multipart forms; everything else on `POST /syllabi`
/// is treated as a JSON text-only creation.
fn is_multipart(ctx: &GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

pub fn configure_routes() -> Scope {
    web::scope("/syllabi")
        .route("", web::get().to(list::process))
        .route(
            "",
            web::post()
                .guard(guard::fn_guard(is_multipart))
                .to(create::process_upload),
        )
        .route("", web::post().to(create::process_text))
        .route("/{id}", web::get().to(view::process))
        .route("/{id}", web::delete().to(delete::process))
        .route("/{id}/download", web::get().to(download::process))
}
