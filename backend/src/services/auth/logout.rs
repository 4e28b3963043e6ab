use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session::{self, SESSION_COOKIE};

pub async fn process(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let conn = db::open(&cfg)?;
        session::destroy_session(&conn, cookie.value())?;
    }

    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_path("/");
    expired.set_max_age(CookieDuration::ZERO);

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(expired)
        .finish())
}
