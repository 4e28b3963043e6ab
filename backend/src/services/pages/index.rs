use actix_web::{HttpRequest, HttpResponse};

use crate::error::ApiError;
use crate::views;

pub async fn process(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let flash = views::take_flash(&req);
    let html = views::render_page("index.html", &[("flash", views::flash_banner(flash))])?;
    Ok(views::page(html))
}
