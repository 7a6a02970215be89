//! HTTP utilities for talking to search frontends

use crate::error::{SearchError, SearchResult};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 15000;

/// Desktop Chrome user agent; several upstreams reject anything else
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Accept header sent by browsers for page navigations
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Ordered header list for a single request
pub type Headers = Vec<(&'static str, String)>;

/// Ordered form or query parameters
pub type Params = Vec<(&'static str, String)>;

/// HTTP client wrapper with search-specific functionality
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_MS)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> Self {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            client,
            default_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// POST a form with headers and decode the body as JSON
    pub async fn post_form_json_with_headers(
        &self,
        url: &str,
        form_data: &Params,
        headers: Headers,
        timeout_ms: Option<u64>,
    ) -> SearchResult<Value> {
        let request = self.client.post(url).form(form_data);
        let request = self.prepare(request, headers, timeout_ms);
        let response = self.send(request, timeout_ms).await?;

        self.handle_response_json(response, timeout_ms).await
    }

    /// GET with query parameters and headers, returning the body as HTML text
    ///
    /// Bodies that declare a non-HTML content type are rejected as
    /// [`SearchError::ParseError`].
    pub async fn get_html_with_headers(
        &self,
        url: &str,
        params: &Params,
        headers: Headers,
        timeout_ms: Option<u64>,
    ) -> SearchResult<String> {
        let request = self.client.get(url).query(params);
        let request = self.prepare(request, headers, timeout_ms);
        let response = self.send(request, timeout_ms).await?;

        self.handle_response_html(response, timeout_ms).await
    }

    fn prepare(
        &self,
        mut request: RequestBuilder,
        headers: Headers,
        timeout_ms: Option<u64>,
    ) -> RequestBuilder {
        request = request.timeout(self.effective_timeout(timeout_ms));
        for (key, value) in headers {
            request = request.header(key, value);
        }
        request
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout_ms: Option<u64>,
    ) -> SearchResult<Response> {
        request
            .send()
            .await
            .map_err(|error| self.transport_error(error, timeout_ms))
    }

    /// Map a reqwest failure, reporting timeouts with the budget actually applied
    fn transport_error(&self, error: reqwest::Error, timeout_ms: Option<u64>) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout {
                timeout_ms: self.effective_timeout(timeout_ms).as_millis() as u64,
            }
        } else {
            SearchError::from(error)
        }
    }

    fn effective_timeout(&self, timeout_ms: Option<u64>) -> Duration {
        timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }

    /// Handle HTTP response and deserialize as JSON
    async fn handle_response_json(
        &self,
        response: Response,
        timeout_ms: Option<u64>,
    ) -> SearchResult<Value> {
        let text = self.success_text(response, timeout_ms).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn handle_response_html(
        &self,
        response: Response,
        timeout_ms: Option<u64>,
    ) -> SearchResult<String> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        let text = self.success_text(response, timeout_ms).await?;

        if let Some(content_type) = content_type {
            if !content_type.contains("html") {
                return Err(SearchError::ParseError(format!(
                    "Expected an HTML document, got content type '{content_type}'"
                )));
            }
        }

        if !looks_like_markup(&text) {
            return Err(SearchError::ParseError(
                "Response body is not an HTML document".to_string(),
            ));
        }

        Ok(text)
    }

    async fn success_text(
        &self,
        response: Response,
        timeout_ms: Option<u64>,
    ) -> SearchResult<String> {
        let status = response.status();

        if status.is_success() {
            response
                .text()
                .await
                .map_err(|error| self.transport_error(error, timeout_ms))
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            Err(SearchError::HttpError {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a URL with query parameters
pub fn build_url(base_url: &str, params: &[(&str, &str)]) -> SearchResult<String> {
    let mut url = Url::parse(base_url)?;

    for (key, value) in params {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url.to_string())
}

/// Whether a body contains at least one tag
pub fn looks_like_markup(body: &str) -> bool {
    let trimmed = body.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    trimmed.starts_with('<') || body.contains("<html") || body.contains("<body")
}

/// Normalize text by removing excess whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove the `<b>`/`</b>` pair upstreams use to highlight query terms
pub fn strip_emphasis(text: &str) -> String {
    text.replace("<b>", "").replace("</b>", "")
}

/// Strip highlight markup and collapse whitespace
pub fn clean_text(text: &str) -> String {
    normalize_text(&strip_emphasis(text))
}

/// Resolve a result `href` against the page it was scraped from.
///
/// Fragment-only and `javascript:` links are not results; only http(s)
/// targets are kept.
pub fn resolve_link(page: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href
        .get(..11)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("javascript:"))
    {
        return None;
    }

    let resolved = page.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(strip_emphasis("<b>Foo</b> bar"), "Foo bar");
        assert_eq!(strip_emphasis("no markup"), "no markup");
        // Only the bold pair is touched
        assert_eq!(strip_emphasis("<i>x</i>"), "<i>x</i>");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  <b>Rust</b>\n   language  "), "Rust language");
    }

    #[test]
    fn test_resolve_link() {
        let page = Url::parse("https://www.privacywall.org/search/secure").unwrap();

        assert_eq!(
            resolve_link(&page, "/out?u=https%3A%2F%2Fa.example").as_deref(),
            Some("https://www.privacywall.org/out?u=https%3A%2F%2Fa.example")
        );
        assert_eq!(
            resolve_link(&page, "//example.com/a").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(
            resolve_link(&page, "http://example.com/x").as_deref(),
            Some("http://example.com/x")
        );
        assert_eq!(resolve_link(&page, "#"), None);
        assert_eq!(resolve_link(&page, "#top"), None);
        assert_eq!(resolve_link(&page, "javascript:void(0)"), None);
        assert_eq!(resolve_link(&page, "JavaScript:go()"), None);
        assert_eq!(resolve_link(&page, "mailto:me@example.com"), None);
        assert_eq!(resolve_link(&page, "   "), None);
    }

    #[test]
    fn test_build_url_encodes_query() {
        let url = build_url("https://leta.mullvad.net/", &[("q", "rust lang&more")]).unwrap();
        assert_eq!(url, "https://leta.mullvad.net/?q=rust+lang%26more");
    }

    #[test]
    fn test_looks_like_markup() {
        assert!(looks_like_markup("<!DOCTYPE html><html></html>"));
        assert!(looks_like_markup("  \n<div></div>"));
        assert!(!looks_like_markup("{\"json\": true}"));
        assert!(!looks_like_markup(""));
        assert!(looks_like_markup("\u{feff}<!DOCTYPE html><html></html>"));
        assert!(looks_like_markup("\u{feff}\n  <div></div>"));
        assert!(!looks_like_markup("\u{feff}{\"json\": true}"));
    }

    #[tokio::test]
    async fn test_stalled_body_reports_applied_timeout() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            // Headers promise more body than is ever sent
            let head = "HTTP/1.1 200 OK\r\n\
                        Content-Type: text/html\r\n\
                        Content-Length: 1000\r\n\r\n<html>";
            socket.write_all(head.as_bytes()).await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = HttpClient::new();
        let result = client
            .get_html_with_headers(&format!("http://{addr}/"), &Params::new(), vec![], Some(200))
            .await;

        assert!(matches!(
            result,
            Err(SearchError::Timeout { timeout_ms: 200 })
        ));
    }
}
