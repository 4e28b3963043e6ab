//! Syllabus creation.
//!
//! Two intake paths share `POST /syllabi`, told apart by a content-type
//! guard in the route table: a multipart form carrying a PDF (plus an
//! optional title field), or a JSON body with title and raw course text.
//!
//! Uploads are streamed to disk under the configured upload directory as
//! `{user_id}_{sanitized_filename}`; only `.pdf` is accepted and the stream
//! is cut off at 16 MiB. After the file lands, its text is extracted and the
//! language model is asked to distill the course content; if either step
//! fails the syllabus is still created with a placeholder body so the upload
//! is not lost.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures_util::StreamExt;
use log::{info, warn};
use rusqlite::params;
use serde_json::json;

use common::requests::CreateSyllabusRequest;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::pdf_text;
use crate::session::AuthedUser;
use crate::util::sanitize_filename;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const SUMMARIZE_SYSTEM_PROMPT: &str = "Extract the main content from this PDF syllabus. \
     Focus on the course objectives, topics, and requirements.";

const EXTRACTION_FALLBACK: &str = "Error extracting content from PDF";

/// Text-only creation: a plain JSON body.
pub async fn process_text(
    cfg: web::Data<Config>,
    user: AuthedUser,
    payload: web::Json<CreateSyllabusRequest>,
) -> Result<HttpResponse, ApiError> {
    let data = payload.into_inner();
    if data.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let conn = db::open(&cfg)?;
    conn.execute(
        "INSERT INTO syllabi (user_id, title, content, file_path, created_at)
         VALUES (?1, ?2, ?3, NULL, ?4)",
        params![user.id, data.title, data.content, Utc::now()],
    )?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Syllabus created successfully" })))
}

pub async fn process_upload(
    cfg: web::Data<Config>,
    user: AuthedUser,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut title: Option<String> = None;
    let mut saved: Option<(String, String)> = None; // (file_path, original filename)

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::Validation(format!("bad multipart field: {}", e)))?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();

                if !filename.to_lowercase().ends_with(".pdf") {
                    return Err(ApiError::Validation(
                        "Invalid file type. Only PDF files are allowed.".to_string(),
                    ));
                }

                fs::create_dir_all(&cfg.upload_dir)?;
                let safe_name = sanitize_filename(&filename);
                let file_path = Path::new(&cfg.upload_dir)
                    .join(format!("{}_{}", user.id, safe_name))
                    .to_string_lossy()
                    .to_string();

                let mut out = File::create(&file_path)?;
                let mut written = 0usize;
                while let Some(chunk) = field.next().await {
                    let chunk = chunk
                        .map_err(|e| ApiError::Validation(format!("upload interrupted: {}", e)))?;
                    written += chunk.len();
                    if written > MAX_UPLOAD_BYTES {
                        drop(out);
                        let _ = fs::remove_file(&file_path);
                        return Err(ApiError::Validation(
                            "File exceeds the 16 MiB upload limit".to_string(),
                        ));
                    }
                    out.write_all(&chunk)?;
                }
                saved = Some((file_path, filename));
            }
            Some("title") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk
                        .map_err(|e| ApiError::Validation(format!("upload interrupted: {}", e)))?;
                    bytes.extend_from_slice(&chunk);
                }
                title = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            _ => {}
        }
    }

    let (file_path, filename) =
        saved.ok_or_else(|| ApiError::Validation("Missing file field in upload".to_string()))?;

    // Distill the PDF into syllabus text. Extraction is CPU-bound, so it
    // runs on the blocking pool. Failures degrade to a placeholder body
    // rather than losing the uploaded file.
    let extraction = {
        let path = file_path.clone();
        tokio::task::spawn_blocking(move || pdf_text::extract_text(Path::new(&path)))
            .await
            .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))?
    };
    let content = match extraction {
        Ok(text) => {
            let client = LlmClient::new(&cfg);
            match client.chat(SUMMARIZE_SYSTEM_PROMPT, &text).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("syllabus summarization failed: {}", e);
                    EXTRACTION_FALLBACK.to_string()
                }
            }
        }
        Err(e) => {
            warn!("PDF text extraction failed for {}: {}", file_path, e);
            EXTRACTION_FALLBACK.to_string()
        }
    };

    let title = title.filter(|t| !t.is_empty()).unwrap_or(filename);
    let conn = db::open(&cfg)?;
    conn.execute(
        "INSERT INTO syllabi (user_id, title, content, file_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user.id, title, content, file_path, Utc::now()],
    )?;
    info!("stored uploaded syllabus for user {}", user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Syllabus created successfully" })))
}
