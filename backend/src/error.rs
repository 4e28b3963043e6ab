//! Error taxonomy for the whole backend.
//!
//! Every handler returns `Result<HttpResponse, ApiError>`; the
//! `ResponseError` impl converts each variant into a JSON body of the form
//! `{"error": "..."}` with the matching status code. Page routes that need
//! redirect-with-flash semantics instead of JSON build their responses
//! directly and never surface these variants.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session cookie on a protected JSON endpoint.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The resource exists but belongs to a different user.
    #[error("Unauthorized")]
    AuthorizationDenied,

    /// Bad input: wrong file type, malformed date, unknown question id.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The LLM call failed or returned something that does not match the
    /// documented JSON shape. Nothing was persisted.
    #[error("{0}")]
    Generation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(format!("I/O error: {}", e))
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::AuthorizationDenied => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Generation(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
