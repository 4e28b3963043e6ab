use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use bcrypt::verify;
use log::info;
use rusqlite::{params, OptionalExtension};

use common::requests::LoginForm;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::{self, SESSION_COOKIE};
use crate::views;

pub async fn page(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let flash = views::take_flash(&req);
    let html = views::render_page("login.html", &[("flash", views::flash_banner(flash))])?;
    Ok(views::page(html))
}

pub async fn process(
    cfg: web::Data<Config>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM users WHERE username = ?1",
            params![form.username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (user_id, password_hash) = match row {
        Some(r) => r,
        None => return Ok(views::redirect_with_flash("/login", "Invalid username or password")),
    };

    let valid = verify(&form.password, &password_hash)
        .map_err(|e| ApiError::Internal(format!("password verify: {}", e)))?;
    if !valid {
        return Ok(views::redirect_with_flash("/login", "Invalid username or password"));
    }

    let token = session::create_session(&conn, user_id)?;
    info!("user {} logged in", form.username);

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(CookieDuration::days(2));

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/dashboard"))
        .cookie(cookie)
        .finish())
}
