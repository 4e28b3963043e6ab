mod config;
mod db;
mod error;
mod llm;
mod pdf_text;
mod services;
mod session;
mod util;
mod views;

use std::fs;
use std::io;
use std::thread;
use std::time::Duration;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use log::{info, warn};
use mime_guess::from_path;

use crate::config::Config;

const MAX_JSON_BYTES: usize = 16 * 1024 * 1024;

/// Embedded static assets (stylesheet, page scripts). HTML pages have their
/// own routes and go through the placeholder renderer instead.
async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    if !path.starts_with("assets/") {
        return HttpResponse::NotFound().body("Not Found");
    }
    match views::STATIC_DIR.get_file(path) {
        Some(file) => {
            let mime = from_path(path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let cfg = Config::from_env();
    db::init(&cfg.database_path)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    fs::create_dir_all(&cfg.upload_dir)?;

    // Drop sessions that expired while the server was down.
    match rusqlite::Connection::open(&cfg.database_path) {
        Ok(conn) => match session::sweep_expired(&conn) {
            Ok(n) if n > 0 => info!("swept {} expired sessions", n),
            Ok(_) => {}
            Err(e) => warn!("session sweep failed: {}", e),
        },
        Err(e) => warn!("session sweep skipped: {}", e),
    }

    let url = format!("http://{}:{}", cfg.host, cfg.port);
    {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url_clone);
        });
    }

    info!("Server running at {}", url);

    let bind_addr = (cfg.host.clone(), cfg.port);
    let data = web::Data::new(cfg);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(MAX_JSON_BYTES))
            .app_data(data.clone())
            .configure(services::auth::configure_routes)
            .configure(services::generate::configure_routes)
            .configure(services::pages::configure_routes)
            .service(services::chat::configure_routes())
            .service(services::syllabi::configure_routes())
            .service(services::assignments::configure_routes())
            .service(services::todos::configure_routes())
            .service(services::study_plans::configure_routes())
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind_addr)?
    .run()
    .await
}
