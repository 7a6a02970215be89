//! Core types and traits shared by every provider

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder used when the upstream item carries no title
pub const NO_TITLE: &str = "No title available";
/// Placeholder used when the upstream item carries no description
pub const NO_DESCRIPTION: &str = "No description available";

/// A single normalized search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result, markup stripped
    pub title: String,
    /// Absolute URL of the result; empty when the upstream omitted it
    pub link: String,
    /// Description of the result, markup stripped
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Debug options for verbose request/response logging
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    /// Enable verbose logging
    pub enabled: bool,
    /// Log request details (URLs, form fields)
    pub log_requests: bool,
    /// Log response summaries
    pub log_responses: bool,
}

/// Options for a single provider search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// The search query text
    pub query: String,
    /// Engine to use; the provider default when `None`
    pub engine: Option<String>,
    /// Country hint, ignored by providers that don't use it
    pub country: Option<String>,
    /// Language hint, ignored by providers that don't use it
    pub language: Option<String>,
    /// Custom timeout in milliseconds
    pub timeout: Option<u64>,
    /// Debug options
    pub debug: Option<DebugOptions>,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            engine: None,
            country: None,
            language: None,
            timeout: Some(15000), // 15 seconds
            debug: None,
        }
    }
}

/// Trait that all search provider implementations must satisfy
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Identifier of the search provider
    fn name(&self) -> &str;

    /// Engines offered by this provider; the first one is the default
    fn supported_engines(&self) -> &[&'static str];

    /// Search method implementation
    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, SearchError>;

    /// Engine used when the caller does not ask for one
    fn default_engine(&self) -> &str {
        self.supported_engines().first().copied().unwrap_or_default()
    }

    fn supports_engine(&self, engine: &str) -> bool {
        self.supported_engines().contains(&engine)
    }

    /// Pick the engine for `options`, rejecting engines this provider lacks.
    ///
    /// Providers call this before building any request.
    fn resolve_engine(&self, options: &SearchOptions) -> Result<String, SearchError> {
        let engine = options
            .engine
            .as_deref()
            .unwrap_or_else(|| self.default_engine());

        if self.supports_engine(engine) {
            Ok(engine.to_string())
        } else {
            Err(SearchError::UnsupportedEngine {
                provider: self.name().to_string(),
                engine: engine.to_string(),
                supported: self
                    .supported_engines()
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            })
        }
    }

    /// Get provider configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
