//! # search-terminal
//!
//! Query privacy-friendly web search frontends (Mullvad Leta, Ekoru, Excite,
//! PrivacyWall) from the terminal and get back one normalized result shape.
//!
//! Each provider hides a different wire format behind the same
//! [`SearchProvider`] trait. A search either goes straight to one provider or,
//! in aggressive mode, retries and fails over across all of them until one
//! returns results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_terminal::{web_search, providers::MullvadProvider, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mullvad = MullvadProvider::new();
//!
//!     let options = SearchOptions::new("Rust programming language").with_engine("brave");
//!     let results = web_search(&mullvad, &options).await?;
//!
//!     for result in results {
//!         println!("{}: {}", result.title, result.link);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod session;
pub mod types;
pub mod utils;

// Re-export common types
pub use config::Config;
pub use error::{SearchError, SearchResult as Result};
pub use orchestrator::{AggressiveSearch, AggressiveSearchConfig, RetryPolicy, SearchOutcome};
pub use providers::ProviderRegistry;
pub use session::{Session, SessionSearch};
pub use types::{DebugOptions, SearchOptions, SearchProvider, SearchResult};

/// Query a single provider and return its normalized results
///
/// Transport and format failures come back as [`SearchError::ProviderError`]
/// with troubleshooting hints attached. Caller mistakes (empty query,
/// unsupported engine) are returned as-is.
///
/// # Examples
///
/// ```rust,no_run
/// use search_terminal::{web_search, providers::ExciteProvider, SearchOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ExciteProvider::new();
/// let results = web_search(&provider, &SearchOptions::new("rust programming")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn web_search(
    provider: &dyn SearchProvider,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>> {
    use utils::debug;

    if options.query.trim().is_empty() {
        return Err(SearchError::InvalidInput(
            "A search query is required".to_string(),
        ));
    }

    debug::log(
        &options.debug,
        "Performing search",
        &format!(
            "provider: {}, engine: {}, query: {}",
            provider.name(),
            options.engine.as_deref().unwrap_or_else(|| provider.default_engine()),
            options.query
        ),
    );

    match provider.search(options).await {
        Ok(results) => {
            debug::log_response(
                &options.debug,
                &format!("Received {} results", results.len()),
            );
            Ok(results)
        }
        Err(error @ (SearchError::UnsupportedEngine { .. } | SearchError::InvalidInput(_))) => {
            Err(error)
        }
        Err(error) => {
            let troubleshooting = get_troubleshooting_info(provider.name(), &error);
            let detailed_error = format!(
                "Search with provider '{}' failed: {}\n\nTroubleshooting: {}",
                provider.name(),
                error,
                troubleshooting
            );

            debug::log(&options.debug, "Search error", &detailed_error);
            Err(SearchError::ProviderError(detailed_error))
        }
    }
}

/// Get provider-specific troubleshooting information based on error
fn get_troubleshooting_info(provider_name: &str, error: &SearchError) -> String {
    let mut suggestions = String::new();

    match error {
        SearchError::HttpError {
            status_code: Some(401 | 403),
            ..
        }
        | SearchError::AuthenticationError(_) => {
            suggestions = "The provider refused the request. It may be blocking automated clients; try another provider or aggressive mode.".to_string();
        }
        SearchError::HttpError {
            status_code: Some(400),
            ..
        } => {
            suggestions = "This is likely due to invalid request parameters. Check your query, engine and country options.".to_string();
        }
        SearchError::HttpError {
            status_code: Some(429),
            ..
        }
        | SearchError::RateLimit(_) => {
            suggestions = "You've exceeded the rate limit for this provider. Try again later or reduce your request frequency.".to_string();
        }
        SearchError::HttpError {
            status_code: Some(500..=599),
            ..
        } => {
            suggestions =
                "The search provider is experiencing server issues. Try again later.".to_string();
        }
        SearchError::Timeout { .. } => {
            suggestions = "The provider did not answer in time. Check your connection or raise the timeout.".to_string();
        }
        SearchError::ParseError(_) => {
            suggestions = "The provider's response format has changed or the page is a block/captcha page. Try another provider.".to_string();
        }
        _ => {}
    }

    if !suggestions.is_empty() {
        return suggestions;
    }

    match provider_name {
        "mullvad" => "Mullvad Leta may be unavailable. Check that leta.mullvad.net is reachable and try the other engine.".to_string(),
        "ekoru" => "The Ekoru campaign gateway may have changed. Try again later or switch provider.".to_string(),
        "excite" => "Excite may be throttling requests. Add a delay between searches or switch provider.".to_string(),
        "privacywall" => "PrivacyWall may be throttling requests. Check the country code or switch provider.".to_string(),
        _ => format!("Check that {provider_name} is reachable and that your search request is valid."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    // Mock provider for testing
    #[derive(Debug)]
    struct MockProvider {
        name: String,
        error: Option<SearchError>,
        results: Vec<SearchResult>,
    }

    impl MockProvider {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                error: None,
                results: vec![
                    SearchResult::new("Test Result 1", "https://example.com/1", "Test content 1"),
                    SearchResult::new("Test Result 2", "https://example.com/2", "Test content 2"),
                ],
            }
        }

        fn with_error(mut self, error: SearchError) -> Self {
            self.error = Some(error);
            self
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn supported_engines(&self) -> &[&'static str] {
            &["web"]
        }

        async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
            self.resolve_engine(options)?;
            match &self.error {
                Some(error) => Err(error.clone()),
                None => Ok(self.results.clone()),
            }
        }
    }

    #[tokio::test]
    async fn test_web_search_success() {
        let provider = MockProvider::new("test");
        let results = web_search(&provider, &SearchOptions::new("test query"))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Test Result 1");
        assert_eq!(results[0].link, "https://example.com/1");
    }

    #[tokio::test]
    async fn test_web_search_empty_query() {
        let provider = MockProvider::new("test");
        match web_search(&provider, &SearchOptions::new("  ")).await {
            Err(SearchError::InvalidInput(msg)) => assert!(msg.contains("query is required")),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_web_search_unsupported_engine_is_not_wrapped() {
        let provider = MockProvider::new("test");
        let options = SearchOptions::new("rust").with_engine("bing");

        assert!(matches!(
            web_search(&provider, &options).await,
            Err(SearchError::UnsupportedEngine { .. })
        ));
    }

    #[tokio::test]
    async fn test_web_search_provider_error() {
        let provider = MockProvider::new("test").with_error(SearchError::HttpError {
            status_code: Some(403),
            message: "Forbidden".to_string(),
            response_body: None,
        });

        match web_search(&provider, &SearchOptions::new("test query")).await {
            Err(SearchError::ProviderError(msg)) => {
                assert!(msg.contains("failed"));
                assert!(msg.contains("refused the request"));
            }
            other => panic!("Expected ProviderError, got {other:?}"),
        }
    }

    #[test]
    fn test_troubleshooting_info_errors() {
        let http = |code| SearchError::HttpError {
            status_code: Some(code),
            message: "status".to_string(),
            response_body: None,
        };

        let test_cases = vec![
            (http(401), "refused the request"),
            (http(403), "refused the request"),
            (http(400), "invalid request parameters"),
            (http(429), "rate limit"),
            (http(502), "server issues"),
            (SearchError::Timeout { timeout_ms: 10 }, "did not answer in time"),
            (SearchError::ParseError("x".to_string()), "response format has changed"),
        ];

        for (error, expected_text) in test_cases {
            let info = get_troubleshooting_info("test", &error);
            assert!(
                info.to_lowercase().contains(expected_text),
                "Expected '{info}' to contain '{expected_text}'"
            );
        }
    }

    #[test]
    fn test_troubleshooting_info_providers() {
        let providers = vec![
            ("mullvad", "leta.mullvad.net"),
            ("ekoru", "campaign gateway"),
            ("excite", "Excite may be throttling"),
            ("privacywall", "country code"),
            ("other", "Check that other is reachable"),
        ];

        let generic_error = SearchError::Other("test error".to_string());

        for (provider, expected_text) in providers {
            let info = get_troubleshooting_info(provider, &generic_error);
            assert!(
                info.contains(expected_text),
                "Expected troubleshooting for '{provider}' to contain '{expected_text}'"
            );
        }
    }
}
