use actix_web::{web, HttpRequest, HttpResponse};

use common::generation::StudyPlanPayload;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html};

pub async fn process(
    cfg: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let plan = match db::get_study_plan(&conn, path.into_inner())? {
        Some(p) => p,
        None => return Ok(views::redirect_with_flash("/study-plans", "Study plan not found")),
    };
    if plan.user_id != user.id {
        return Ok(views::redirect_with_flash("/study-plans", "Unauthorized access"));
    }

    let flash = views::take_flash(&req);
    let html = views::render_page(
        "view_study_plan.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("title", escape_html(&plan.title)),
            ("start_date", plan.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", plan.end_date.format("%Y-%m-%d").to_string()),
            ("schedule", schedule_html(&plan.content)),
        ],
    )?;
    Ok(views::page(html))
}

/// Re-parse the stored plan JSON into the day/session schedule. Content
/// that no longer parses (it was written by an older build, say) falls back
/// to a raw dump instead of a broken page.
fn schedule_html(content: &str) -> String {
    let plan: StudyPlanPayload = match serde_json::from_str(content) {
        Ok(p) => p,
        Err(_) => {
            return format!("<pre>{}</pre>", escape_html(content));
        }
    };

    plan.days
        .iter()
        .map(|day| {
            let sessions: String = day
                .sessions
                .iter()
                .map(|s| {
                    format!(
                        r#"<li class="session {}"><span class="time">{} - {}</span> <strong>{}</strong> {}</li>"#,
                        escape_html(&s.activity_type),
                        escape_html(&s.start_time),
                        escape_html(&s.end_time),
                        escape_html(&s.title),
                        escape_html(&s.description)
                    )
                })
                .collect();
            format!(
                r#"<section class="day"><h3>{}</h3><ul>{}</ul></section>"#,
                escape_html(&day.date),
                sessions
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_renders_days_and_sessions() {
        let content = r#"{
            "title": "Week plan",
            "days": [{"date": "2026-03-01", "sessions": [
                {"start_time": "09:00", "end_time": "10:30",
                 "activity_type": "study", "title": "Algebra",
                 "description": "Groups and rings", "syllabus_id": 1}
            ]}]
        }"#;
        let html = schedule_html(content);
        assert!(html.contains("2026-03-01"));
        assert!(html.contains("09:00 - 10:30"));
        assert!(html.contains("Algebra"));
    }

    #[test]
    fn unparseable_content_falls_back_to_raw_dump() {
        let html = schedule_html("not json");
        assert!(html.starts_with("<pre>"));
    }
}
