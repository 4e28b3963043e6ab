mod list;
mod view;

use actix_web::web::{get, scope};
use actix_web::Scope;

pub fn configure_routes() -> Scope {
    scope("/study-plans")
        .route("", get().to(list::process))
        .route("/{id}", get().to(view::process))
}
