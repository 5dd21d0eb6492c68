use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

const CACHE_ONE_DAY: &str = "public, max-age=86400";

/// Public pages listed in the sitemap
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/register"];

pub struct SeoController {
    public_base_url: String,
}

impl SeoController {
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /robots.txt
    pub async fn robots(State(controller): State<Arc<SeoController>>) -> impl IntoResponse {
        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, CACHE_ONE_DAY),
            ],
            controller.robots_txt(),
        )
    }

    /// GET /sitemap.xml
    pub async fn sitemap(State(controller): State<Arc<SeoController>>) -> impl IntoResponse {
        (
            [
                (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
                (header::CACHE_CONTROL, CACHE_ONE_DAY),
            ],
            controller.sitemap_xml(),
        )
    }

    fn robots_txt(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\nDisallow: /chat\nDisallow: /api/\nDisallow: /stripe/\n\nSitemap: {}/sitemap.xml\n",
            self.public_base_url
        )
    }

    fn sitemap_xml(&self) -> String {
        let urls: String = PUBLIC_PATHS
            .iter()
            .map(|path| format!("  <url><loc>{}{}</loc></url>\n", self.public_base_url, path))
            .collect();

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
            urls
        )
    }
}
