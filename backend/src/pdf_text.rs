use std::path::Path;

use crate::error::ApiError;

/// Extract the text of a stored PDF. Extraction problems are reported as
/// validation failures; callers that merely supplement existing content
/// log and continue instead of failing the request.
pub fn extract_text(path: &Path) -> Result<String, ApiError> {
    pdf_extract::extract_text(path)
        .map_err(|e| ApiError::Validation(format!("Could not read PDF text: {}", e)))
}
