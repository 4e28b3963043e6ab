//! Assignment routes: the listing page, the detail/answer page, and the
//! submission endpoint that grades an answer set.

mod list;
mod submit;
mod view;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

pub fn configure_routes() -> Scope {
    scope("/assignments")
        .route("", get().to(list::process))
        .route("/{id}", get().to(view::process))
        .route("/{id}/submit", post().to(submit::process))
}
