mod ask;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

pub fn configure_routes() -> Scope {
    scope("/chat")
        .route("", get().to(ask::page))
        .route("", post().to(ask::process))
}
