//! Excite provider (Bing-backed HTML results page)

use crate::{
    error::SearchResult,
    providers::html::{self, CardLayout},
    types::{SearchOptions, SearchProvider, SearchResult as SearchResultType},
    utils::{
        debug,
        http::{HttpClient, ACCEPT_HTML, ACCEPT_LANGUAGE, BROWSER_USER_AGENT},
    },
};
use std::collections::HashMap;

const ENGINES: &[&str] = &["web"];

/// Result card markup on `results.excite.com/serp`
pub const EXCITE_LAYOUT: CardLayout = CardLayout {
    card: "div.web-bing__result",
    title: "a.web-bing__title",
    link: "a.web-bing__title",
    description: "span.web-bing__description",
    required: Some("span.web-bing__url"),
};

/// Excite configuration
#[derive(Debug, Clone)]
pub struct ExciteConfig {
    /// Results page endpoint
    pub base_url: String,
    /// Value sent as `Origin`; `Referer` is the same with a trailing slash
    pub origin: String,
}

impl Default for ExciteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://results.excite.com/serp".to_string(),
            origin: "https://results.excite.com".to_string(),
        }
    }
}

/// Excite search provider
#[derive(Debug)]
pub struct ExciteProvider {
    config: ExciteConfig,
    http_client: HttpClient,
}

impl ExciteProvider {
    pub fn new() -> Self {
        Self::with_config(ExciteConfig::default())
    }

    pub fn with_config(config: ExciteConfig) -> Self {
        Self {
            config,
            http_client: HttpClient::new(),
        }
    }

    /// Point the provider at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Parse a results page; relative links resolve against `page_url`
    pub fn parse_html(html: &str, page_url: &str) -> SearchResult<Vec<SearchResultType>> {
        html::parse_cards(html, page_url, &EXCITE_LAYOUT)
    }
}

impl Default for ExciteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for ExciteProvider {
    fn name(&self) -> &str {
        "excite"
    }

    fn supported_engines(&self) -> &[&'static str] {
        ENGINES
    }

    async fn search(&self, options: &SearchOptions) -> SearchResult<Vec<SearchResultType>> {
        self.resolve_engine(options)?;

        let params = vec![("q", options.query.clone())];
        let headers = vec![
            ("User-Agent", BROWSER_USER_AGENT.to_string()),
            ("Accept", ACCEPT_HTML.to_string()),
            ("Accept-Language", ACCEPT_LANGUAGE.to_string()),
            ("Referer", format!("{}/", self.config.origin)),
            ("Origin", self.config.origin.clone()),
        ];

        debug::log_request(
            &options.debug,
            "Excite request",
            &format!("query: {}", options.query),
        );

        let body = self
            .http_client
            .get_html_with_headers(&self.config.base_url, &params, headers, options.timeout)
            .await?;

        debug::log_response(
            &options.debug,
            &format!("Excite HTML response received (length: {})", body.len()),
        );

        Self::parse_html(&body, &self.config.base_url)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://results.excite.com/serp";

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html><body>
          <div class="web-bing__result">
            <a class="web-bing__title" href="https://www.rust-lang.org/">Rust Programming <b>Language</b></a>
            <span class="web-bing__url">www.rust-lang.org</span>
            <span class="web-bing__description">A language empowering everyone.</span>
          </div>
          <div class="web-bing__result">
            <a class="web-bing__title" href="https://doc.rust-lang.org/book/">The Book</a>
            <span class="web-bing__url">doc.rust-lang.org</span>
          </div>
          <div class="web-bing__result">
            <a class="web-bing__title" href="https://ads.example/">Sponsored</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let results = ExciteProvider::parse_html(PAGE, PAGE_URL).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].link, "https://www.rust-lang.org/");
        assert_eq!(results[0].snippet, "A language empowering everyone.");
        assert_eq!(results[1].title, "The Book");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_page_without_results_is_empty() {
        let page = "<html><body><div class=\"no-results\">Nothing found</div></body></html>";
        assert!(ExciteProvider::parse_html(page, PAGE_URL).unwrap().is_empty());
    }

    #[test]
    fn test_only_web_engine() {
        let provider = ExciteProvider::new();
        assert_eq!(provider.supported_engines(), &["web"]);
        assert_eq!(provider.name(), "excite");
    }
}
