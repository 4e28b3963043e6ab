//! Account routes: registration, login, logout.
//!
//! Login issues a database-backed session token delivered as an HttpOnly
//! cookie; logout deletes the row and expires the cookie. These are form
//! endpoints, so failures flash a message and redirect rather than
//! returning JSON.

mod login;
mod logout;
mod register;

use actix_web::web::{self, ServiceConfig};

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/register", web::get().to(register::page))
        .route("/register", web::post().to(register::process))
        .route("/login", web::get().to(login::page))
        .route("/login", web::post().to(login::process))
        .route("/logout", web::get().to(logout::process));
}
