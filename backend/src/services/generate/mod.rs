//! # Content generation service
//!
//! The three generation endpoints share one pipeline: gather source text,
//! ask the model for a strictly-shaped JSON document, parse it into a typed
//! payload, and only then write rows inside a single transaction. A
//! transport failure or a shape mismatch aborts before the transaction
//! starts, so a failed generation never leaves partial rows behind.
//!
//! Registered routes:
//! - `POST /generate_notes`: one note row per generated subtopic.
//! - `POST /generate_assignment`: an assignment row plus one question row
//!   per generated question, flattened across topics.
//! - `POST /generate-study-plan`: a single plan row holding the raw JSON.

mod assignment;
mod notes;
mod study_plan;

use std::path::Path;

use actix_web::web::{self, ServiceConfig};
use log::warn;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use common::model::syllabus::Syllabus;

use crate::db;
use crate::error::ApiError;
use crate::pdf_text;
use crate::session::AuthedUser;

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/generate_notes", web::post().to(notes::process))
        .route("/generate_assignment", web::post().to(assignment::process))
        .route("/generate-study-plan", web::post().to(study_plan::process));
}

/// Fetch a syllabus and enforce ownership.
fn owned_syllabus(
    conn: &Connection,
    syllabus_id: i64,
    user: &AuthedUser,
) -> Result<Syllabus, ApiError> {
    let syllabus = db::get_syllabus(conn, syllabus_id)?
        .ok_or_else(|| ApiError::NotFound("Syllabus not found".to_string()))?;
    if syllabus.user_id != user.id {
        return Err(ApiError::AuthorizationDenied);
    }
    Ok(syllabus)
}

/// The text handed to the model: the stored syllabus content, supplemented
/// with freshly extracted PDF text when a file is on disk. Extraction
/// problems are logged and skipped; the stored content is always enough to
/// generate from.
fn source_text(syllabus: &Syllabus) -> String {
    let mut text = syllabus.content.clone();
    if let Some(file_path) = syllabus.file_path.as_deref() {
        if Path::new(file_path).exists() {
            match pdf_text::extract_text(Path::new(file_path)) {
                Ok(pdf) => {
                    text.push_str("\n\nAdditional content from PDF:\n");
                    text.push_str(&pdf);
                }
                Err(e) => warn!("skipping PDF supplement for {}: {}", file_path, e),
            }
        }
    }
    text
}

/// Parse a completion into both the raw JSON (echoed back to the client)
/// and the typed payload that gates persistence.
fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<(serde_json::Value, T), ApiError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::Generation(format!("Model did not return valid JSON: {}", e)))?;
    let payload: T = serde_json::from_value(value.clone())
        .map_err(|e| ApiError::Generation(format!("Model response has the wrong shape: {}", e)))?;
    Ok((value, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::generation::NotesPayload;

    #[test]
    fn malformed_completion_is_a_generation_failure() {
        let err = parse_payload::<NotesPayload>("I could not comply").unwrap_err();
        assert!(matches!(err, ApiError::Generation(_)));
    }

    #[test]
    fn shape_mismatch_is_a_generation_failure() {
        // Valid JSON, but `topics` is missing.
        let err = parse_payload::<NotesPayload>(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Generation(_)));
    }
}
