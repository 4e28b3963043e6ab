//! Todo CRUD: a server-rendered list page plus JSON create/update/delete.

mod create;
mod delete;
mod list;
mod update;

use actix_web::web;
use actix_web::Scope;

pub fn configure_routes() -> Scope {
    web::scope("/todos")
        .route("", web::get().to(list::process))
        .route("", web::post().to(create::process))
        .route("/{id}", web::put().to(update::process))
        .route("/{id}", web::delete().to(delete::process))
}
