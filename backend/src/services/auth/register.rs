use actix_web::{web, HttpRequest, HttpResponse};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use log::info;
use rusqlite::params;

use common::requests::RegisterForm;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::views;

pub async fn page(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let flash = views::take_flash(&req);
    let html = views::render_page("register.html", &[("flash", views::flash_banner(flash))])?;
    Ok(views::page(html))
}

pub async fn process(
    cfg: web::Data<Config>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, ApiError> {
    match register_user(&cfg, form.into_inner()) {
        Ok(username) => {
            info!("registered user {}", username);
            Ok(views::redirect_with_flash("/login", "Registration successful!"))
        }
        Err(RegisterError::Taken(message)) => Ok(views::redirect_with_flash("/register", message)),
        Err(RegisterError::Api(e)) => Err(e),
    }
}

enum RegisterError {
    Taken(&'static str),
    Api(ApiError),
}

impl From<ApiError> for RegisterError {
    fn from(e: ApiError) -> Self {
        RegisterError::Api(e)
    }
}

impl From<rusqlite::Error> for RegisterError {
    fn from(e: rusqlite::Error) -> Self {
        RegisterError::Api(e.into())
    }
}

fn register_user(cfg: &web::Data<Config>, form: RegisterForm) -> Result<String, RegisterError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(RegisterError::Taken("Username and password are required"));
    }

    let conn = db::open(cfg)?;
    let username_taken: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![form.username],
            |row| row.get(0),
        )?;
    if username_taken {
        return Err(RegisterError::Taken("Username already exists"));
    }
    let email_taken: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![form.email],
            |row| row.get(0),
        )?;
    if email_taken {
        return Err(RegisterError::Taken("Email already registered"));
    }

    let password_hash = hash(&form.password, DEFAULT_COST)
        .map_err(|e| RegisterError::Api(ApiError::Internal(format!("password hash: {}", e))))?;
    conn.execute(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![form.username, form.email, password_hash, Utc::now()],
    )?;
    Ok(form.username)
}
