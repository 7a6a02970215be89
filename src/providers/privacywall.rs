//! PrivacyWall provider (HTML results page)

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

/// Country sent when the caller gives none
const DEFAULT_COUNTRY: &str = "US";

/// Result card markup on `privacywall.org/search/secure`
pub const PRIVACYWALL_LAYOUT: CardLayout = CardLayout {
    card: "div.result-card",
    title: "div.result_title",
    link: "a[href]",
    description: "div.result-description",
    required: None,
};

/// PrivacyWall configuration
#[derive(Debug, Clone)]
pub struct PrivacyWallConfig {
    /// Results page endpoint
    pub base_url: String,
    /// Value sent as `Referer`
    pub referer: String,
}

impl Default for PrivacyWallConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.privacywall.org/search/secure".to_string(),
            referer: "https://www.privacywall.org/".to_string(),
        }
    }
}

/// PrivacyWall search provider
#[derive(Debug)]
pub struct PrivacyWallProvider {
    config: PrivacyWallConfig,
    http_client: HttpClient,
}

impl PrivacyWallProvider {
    pub fn new() -> Self {
        Self::with_config(PrivacyWallConfig::default())
    }

    pub fn with_config(config: PrivacyWallConfig) -> Self {
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
        html::parse_cards(html, page_url, &PRIVACYWALL_LAYOUT)
    }
}

impl Default for PrivacyWallProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for PrivacyWallProvider {
    fn name(&self) -> &str {
        "privacywall"
    }

    fn supported_engines(&self) -> &[&'static str] {
        ENGINES
    }

    async fn search(&self, options: &SearchOptions) -> SearchResult<Vec<SearchResultType>> {
        self.resolve_engine(options)?;

        let country = options
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY);

        let params = vec![("q", options.query.clone()), ("cc", country.to_string())];
        let headers = vec![
            ("User-Agent", BROWSER_USER_AGENT.to_string()),
            ("Accept", ACCEPT_HTML.to_string()),
            ("Accept-Language", ACCEPT_LANGUAGE.to_string()),
            ("Referer", self.config.referer.clone()),
        ];

        debug::log_request(
            &options.debug,
            "PrivacyWall request",
            &format!("query: {}, cc: {country}", options.query),
        );

        let body = self
            .http_client
            .get_html_with_headers(&self.config.base_url, &params, headers, options.timeout)
            .await?;

        debug::log_response(
            &options.debug,
            &format!("PrivacyWall HTML response received (length: {})", body.len()),
        );

        Self::parse_html(&body, &self.config.base_url)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config.insert("default_country".to_string(), DEFAULT_COUNTRY.to_string());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.privacywall.org/search/secure";

    #[test]
    fn test_parse_result_cards() {
        let page = r#"
            <html><body>
              <div class="result-card">
                <a href="https://www.mozilla.org/">
                  <div class="result_title"><b>Mozilla</b> Firefox</div>
                </a>
                <div class="result-url">www.mozilla.org</div>
                <div class="result-description">Get <b>Firefox</b> for desktop.</div>
              </div>
              <div class="result-card">
                <div class="result_title">Card without a link</div>
              </div>
              <div class="result-card">
                <a href="https://example.org/">no title</a>
              </div>
            </body></html>
        "#;

        let results = PrivacyWallProvider::parse_html(page, PAGE_URL).unwrap();
        assert_eq!(
            results,
            vec![SearchResultType::new(
                "Mozilla Firefox",
                "https://www.mozilla.org/",
                "Get Firefox for desktop."
            )]
        );
    }

    #[test]
    fn test_missing_description_is_empty_text() {
        let page = r#"<div class="result-card"><div class="result_title">T</div><a href="https://t.example/">t</a></div>"#;

        let results = PrivacyWallProvider::parse_html(page, PAGE_URL).unwrap();
        assert_eq!(results[0].snippet, "");
    }

    #[test]
    fn test_redirect_links_resolve_against_site() {
        let page = r##"
            <div class="result-card">
              <a href="/out?u=https%3A%2F%2Fwww.mozilla.org%2F"><div class="result_title">Mozilla</div></a>
            </div>
            <div class="result-card">
              <a href="#"><div class="result_title">Placeholder</div></a>
            </div>
        "##;

        let results = PrivacyWallProvider::parse_html(page, PAGE_URL).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].link,
            "https://www.privacywall.org/out?u=https%3A%2F%2Fwww.mozilla.org%2F"
        );
    }

    #[test]
    fn test_zero_cards_is_empty() {
        let page = "<html><head><title>PrivacyWall</title></head><body></body></html>";
        assert!(PrivacyWallProvider::parse_html(page, PAGE_URL).unwrap().is_empty());
    }
}
