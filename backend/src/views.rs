//! Server-side HTML rendering.
//!
//! Page shells live under `static/templates/` and are embedded into the
//! binary at compile time. A template carries `[ph:name]` placeholders that
//! are substituted with precomputed HTML fragments or JSON blobs before the
//! page is served; everything user-controlled goes through `escape_html`
//! first. Note bodies are markdown and are rendered with `pulldown_cmark`.
//!
//! Flash messages ride a short-lived cookie: a redirect sets it, the next
//! page render shows it once and expires it.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use include_dir::{include_dir, Dir};
use pulldown_cmark::{html, Parser};
use regex::Regex;

use crate::error::ApiError;

pub static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

const FLASH_COOKIE: &str = "flash";

/// Load an embedded template and substitute every `[ph:name]` marker with
/// the matching value. Unknown markers are replaced with an empty string.
pub fn render_page(name: &str, values: &[(&str, String)]) -> Result<String, ApiError> {
    let path = format!("templates/{}", name);
    let file = STATIC_DIR
        .get_file(&path)
        .ok_or_else(|| ApiError::Internal(format!("missing template: {}", path)))?;
    let text = file
        .contents_utf8()
        .ok_or_else(|| ApiError::Internal(format!("template is not UTF-8: {}", path)))?;

    let re = Regex::new(r"\[ph:([a-z_]+)\]")
        .map_err(|e| ApiError::Internal(format!("placeholder regex: {}", e)))?;
    let rendered = re.replace_all(text, |caps: &regex::Captures| {
        let key = &caps[1];
        values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// A rendered page. Expires the flash cookie so the banner shows only once.
pub fn page(html: String) -> HttpResponse {
    let mut expired = Cookie::new(FLASH_COOKIE, "");
    expired.set_path("/");
    expired.set_max_age(CookieDuration::ZERO);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(expired)
        .body(html)
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

pub fn redirect_with_flash(location: &str, message: &str) -> HttpResponse {
    let mut cookie = Cookie::new(FLASH_COOKIE, message.to_string());
    cookie.set_path("/");
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(cookie)
        .finish()
}

pub fn take_flash(req: &HttpRequest) -> Option<String> {
    req.cookie(FLASH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// The `[ph:flash]` fragment: a banner when a message is pending, else empty.
pub fn flash_banner(message: Option<String>) -> String {
    match message {
        Some(msg) => format!(r#"<div class="flash">{}</div>"#, escape_html(&msg)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted_and_unknown_ones_cleared() {
        // login.html carries [ph:flash]; no value means it renders empty.
        let html = render_page("login.html", &[("flash", "<b>hi</b>".to_string())]).unwrap();
        assert!(html.contains("<b>hi</b>"));
        assert!(!html.contains("[ph:"));

        let bare = render_page("login.html", &[]).unwrap();
        assert!(!bare.contains("[ph:"));
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn markdown_renders_headings_and_lists() {
        let html = markdown_to_html("# Title\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn flash_banner_escapes_message() {
        let banner = flash_banner(Some("<script>".to_string()));
        assert!(banner.contains("&lt;script&gt;"));
        assert_eq!(flash_banner(None), "");
    }
}
