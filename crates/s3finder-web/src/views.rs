//! HTML views.

use axum::response::Html;
use handlebars::{Handlebars, TemplateError};
use serde_json::json;
use tracing::warn;

use s3finder_storage::PresignedUrl;

use crate::error::{ApiError, ApiResult};

const SEARCH_TEMPLATE: &str = "search";
const RESULT_TEMPLATE: &str = "result";

/// Handlebars templates for the search form and the result page.
pub struct Views {
    engine: Handlebars<'static>,
    hide_error_details: bool,
}

impl Views {
    /// Register the templates. With `hide_error_details`, rendering failures
    /// reach the client as a generic message and are only logged in full.
    pub fn new(hide_error_details: bool) -> Result<Self, TemplateError> {
        let mut engine = Handlebars::new();
        engine.register_escape_fn(escape_html);
        engine.register_template_string(SEARCH_TEMPLATE, include_str!("../templates/index.hbs"))?;
        engine.register_template_string(RESULT_TEMPLATE, include_str!("../templates/result.hbs"))?;
        Ok(Self {
            engine,
            hide_error_details,
        })
    }

    /// Search form, optionally pre-filled with the last file name.
    pub fn search_form(&self, file_name: Option<&str>) -> ApiResult<Html<String>> {
        let data = json!({ "file_name": file_name.unwrap_or_default() });
        self.render(SEARCH_TEMPLATE, &data)
    }

    /// Result page with the download link.
    pub fn result(&self, file_name: &str, url: &PresignedUrl) -> ApiResult<Html<String>> {
        let data = json!({
            "file_name": file_name,
            "url": url.url,
            "expires_at": url.expires_at.to_rfc3339(),
        });
        self.render(RESULT_TEMPLATE, &data)
    }

    fn render(&self, template: &str, data: &serde_json::Value) -> ApiResult<Html<String>> {
        self.engine.render(template, data).map(Html).map_err(|e| {
            warn!(template, error = %e, "Template rendering failed");
            if self.hide_error_details {
                ApiError::internal("An internal error occurred")
            } else {
                ApiError::internal(format!("Template error: {}", e))
            }
        })
    }
}

/// Escape text for HTML element content and quoted attribute values.
///
/// Unlike the Handlebars default, `=` and backticks are left alone so that
/// URLs stay readable in the page source.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;

    use super::*;

    fn presigned(url: &str) -> PresignedUrl {
        PresignedUrl {
            url: url.to_string(),
            expires_at: Utc::now(),
            expires_in_secs: 3600,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("<img src=x>"), "&lt;img src=x&gt;");
        assert_eq!(escape_html("\"'"), "&quot;&#x27;");
        assert_eq!(escape_html("cat.png"), "cat.png");
    }

    #[test]
    fn test_empty_search_form() {
        let views = Views::new(false).unwrap();
        let Html(body) = views.search_form(None).unwrap();
        assert!(body.contains("<form method=\"post\" action=\"/\">"));
        assert!(body.contains("name=\"file_name\""));
        assert!(body.contains("value=\"\""));
    }

    #[test]
    fn test_search_form_preserves_escaped_name() {
        let views = Views::new(false).unwrap();
        let Html(body) = views.search_form(Some("\"><script>alert(1)</script>")).unwrap();
        assert!(body.contains("value=\"&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;\""));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_result_page() {
        let views = Views::new(false).unwrap();
        let url = presigned("https://example.com/images_buket/cat.png?a=1&b=2");
        let Html(body) = views.result("cat.png", &url).unwrap();
        assert!(body.contains("<strong id=\"file-name\">cat.png</strong>"));
        assert!(body.contains("href=\"https://example.com/images_buket/cat.png?a=1&amp;b=2\""));
    }

    fn views_with_broken_template(hide_error_details: bool) -> Views {
        let mut views = Views::new(hide_error_details).unwrap();
        views
            .engine
            .register_template_string("broken", "{{> no_such_partial}}")
            .unwrap();
        views
    }

    #[test]
    fn test_render_failure_shows_detail_in_development() {
        let views = views_with_broken_template(false);
        let err = views.render("broken", &json!({})).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("Template error"));
    }

    #[test]
    fn test_render_failure_hides_detail_in_production() {
        let views = views_with_broken_template(true);
        let err = views.render("broken", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Internal error: An internal error occurred");
    }
}
