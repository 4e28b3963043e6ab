use actix_web::{web, HttpRequest, HttpResponse};

use common::model::study_plan::StudyPlan;

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html};

pub async fn process(cfg: web::Data<Config>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let plans = db::study_plans_for_user(&conn, user.id)?;
    let flash = views::take_flash(&req);
    let html = views::render_page(
        "study_plans.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("plans", plan_items(&plans)),
        ],
    )?;
    Ok(views::page(html))
}

fn plan_items(plans: &[StudyPlan]) -> String {
    if plans.is_empty() {
        return r#"<p class="empty">No study plans yet. Pick a date range and generate one.</p>"#
            .to_string();
    }
    let items: String = plans
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="/study-plans/{}">{}</a> <span class="due">{} to {}</span></li>"#,
                p.id,
                escape_html(&p.title),
                p.start_date.format("%Y-%m-%d"),
                p.end_date.format("%Y-%m-%d")
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
