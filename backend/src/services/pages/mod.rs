//! Top-level HTML pages that aggregate data across entities: the public
//! landing page, the dashboard, and the calendar.

mod calendar;
mod dashboard;
mod index;

use actix_web::web::{self, ServiceConfig};

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/", web::get().to(index::process))
        .route("/dashboard", web::get().to(dashboard::process))
        .route("/calendar", web::get().to(calendar::process));
}
