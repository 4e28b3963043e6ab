//! Cookie + database session layer.
//!
//! Logging in stores a random token in the `sessions` table and hands it to
//! the browser as an HttpOnly cookie. `AuthedUser` is the request-scoped
//! identity: JSON endpoints take it as an extractor (missing/expired session
//! means 401), while page handlers use `page_user` and redirect to `/login`
//! themselves. Expired rows are deleted on sight and swept once at startup.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "session_token";

const SESSION_DAYS: i64 = 2;

/// The authenticated identity passed explicitly into service logic.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Create a session row for the user and return the cookie token.
pub fn create_session(conn: &Connection, user_id: i64) -> Result<String, ApiError> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![token, user_id, now, now + Duration::days(SESSION_DAYS)],
    )?;
    Ok(token)
}

pub fn destroy_session(conn: &Connection, token: &str) -> Result<(), ApiError> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Remove every expired session. Run at startup.
pub fn sweep_expired(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "DELETE FROM sessions WHERE expires_at < ?1",
        params![Utc::now()],
    )
}

/// Resolve a token to its user, dropping the session if it has expired.
pub fn lookup(conn: &Connection, token: &str) -> Result<Option<AuthedUser>, ApiError> {
    let row = conn
        .query_row(
            "SELECT u.id, u.username, u.email, s.expires_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok((
                    AuthedUser {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                    },
                    row.get::<_, DateTime<Utc>>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((user, expires_at)) if expires_at > Utc::now() => Ok(Some(user)),
        Some(_) => {
            destroy_session(conn, token)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Session lookup for page handlers, which redirect instead of returning 401.
pub fn page_user(req: &HttpRequest, conn: &Connection) -> Result<Option<AuthedUser>, ApiError> {
    match req.cookie(SESSION_COOKIE) {
        Some(cookie) => lookup(conn, cookie.value()),
        None => Ok(None),
    }
}

fn authed_from_request(req: &HttpRequest) -> Result<AuthedUser, ApiError> {
    let cfg = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| ApiError::Internal("configuration not available".to_string()))?;
    let cookie = req
        .cookie(SESSION_COOKIE)
        .ok_or(ApiError::AuthenticationRequired)?;
    let conn = db::open(cfg)?;
    lookup(&conn, cookie.value())?.ok_or(ApiError::AuthenticationRequired)
}

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authed_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ('alice', 'alice@example.com', 'hash', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn session_round_trip() {
        let conn = test_conn();
        let token = create_session(&conn, 1).unwrap();
        let user = lookup(&conn, &token).unwrap().unwrap();
        assert_eq!(user.username, "alice");

        destroy_session(&conn, &token).unwrap();
        assert!(lookup(&conn, &token).unwrap().is_none());
    }

    #[test]
    fn expired_session_does_not_authenticate() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES ('stale', 1, '2000-01-01T00:00:00Z', '2000-01-03T00:00:00Z')",
            [],
        )
        .unwrap();

        assert!(lookup(&conn, "stale").unwrap().is_none());
        // The stale row is gone afterwards.
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
