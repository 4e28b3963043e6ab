use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

use crate::error::ApiError;

/// Parse the date formats the UI sends: RFC 3339, `YYYY-MM-DDTHH:MM`
/// (datetime-local inputs), or a bare `YYYY-MM-DD`. Naive values are taken
/// as UTC. Anything else is a validation failure.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ApiError::Validation(format!("Invalid date: {}", input)))
}

/// Reduce an uploaded filename to a safe basename: path components dropped,
/// anything outside `[A-Za-z0-9._-]` collapsed to underscores.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let re = Regex::new(r"[^A-Za-z0-9._-]+").expect("filename regex");
    let cleaned = re.replace_all(base, "_").trim_matches('_').to_string();
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_ui_date_formats() {
        assert_eq!(
            parse_datetime("2026-03-01T10:30:00Z").unwrap().to_rfc3339(),
            "2026-03-01T10:30:00+00:00"
        );
        assert!(parse_datetime("2026-03-01T10:30").is_ok());
        assert!(parse_datetime("2026-03-01").is_ok());
        assert!(matches!(
            parse_datetime("next tuesday"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn sanitizes_hostile_filenames() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my syllabus (v2).pdf"), "my_syllabus_v2_.pdf");
        assert_eq!(sanitize_filename("///"), "upload.pdf");
    }
}
