use actix_web::{web, HttpRequest, HttpResponse};
use rusqlite::Connection;

use common::model::calendar::{CalendarEvent, CalendarEventProps};

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views;

pub async fn process(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let events = collect_events(&conn, user.id)?;
    let events_json = serde_json::to_string(&events)
        .map_err(|e| ApiError::Internal(format!("event serialization: {}", e)))?
        // keep the inline <script> block well-formed whatever the titles say
        .replace('<', "\\u003c");

    let flash = views::take_flash(&req);
    let html = views::render_page(
        "calendar.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("events_json", events_json),
        ],
    )?;
    Ok(views::page(html))
}

/// Todos and assignment due dates mapped into the event shape the calendar
/// script consumes. An assignment counts as completed once answers have
/// been stored for it.
fn collect_events(conn: &Connection, user_id: i64) -> Result<Vec<CalendarEvent>, ApiError> {
    let mut events = Vec::new();

    for todo in db::todos_for_user(conn, user_id)? {
        let due = todo.due_date.map(|d| d.to_rfc3339());
        events.push(CalendarEvent {
            id: format!("todo-{}", todo.id),
            title: todo.title,
            start: due.clone(),
            end: due,
            extended_props: CalendarEventProps {
                kind: "todo".to_string(),
                description: todo.description,
                completed: todo.completed,
                priority: Some(todo.priority),
                syllabus_id: None,
            },
        });
    }

    for assignment in db::assignments_for_user(conn, user_id)? {
        let due = Some(assignment.due_date.to_rfc3339());
        events.push(CalendarEvent {
            id: format!("assignment-{}", assignment.id),
            title: assignment.title,
            start: due.clone(),
            end: due,
            extended_props: CalendarEventProps {
                kind: "assignment".to_string(),
                description: assignment.description,
                completed: assignment.student_answers.is_some(),
                priority: None,
                syllabus_id: Some(assignment.syllabus_id),
            },
        });
    }

    Ok(events)
}
