//! Askama templates for the web frontend.

use askama::Template;

/// Map page. The script takes its starting view from these values and
/// re-reads `/api/view` every `refresh_ms`.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
    pub refresh_ms: u64,
}
