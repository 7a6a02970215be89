//! Error types for search-terminal

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Everything that can go wrong between a query and a list of results
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// The requested engine is not offered by the provider
    #[error("Engine '{engine}' not supported by {provider}. Use one of: {}", supported.join(", "))]
    UnsupportedEngine {
        provider: String,
        engine: String,
        supported: Vec<String>,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Upstream refused the request
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Upstream payload did not have the shape the parser depends on
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No provider registered under the given id
    #[error("Provider '{name}' not found. Available providers: {}", available.join(", "))]
    ProviderNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller gave up before a result was produced
    #[error("Search cancelled")]
    Cancelled,

    /// Generic error for unhandled cases
    #[error("Search error: {0}")]
    Other(String),
}

impl SearchError {
    /// Network or HTTP level failure
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SearchError::HttpError { .. }
                | SearchError::Timeout { .. }
                | SearchError::RateLimit(_)
                | SearchError::AuthenticationError(_)
        )
    }

    /// Upstream answered but the payload was unusable
    pub fn is_format(&self) -> bool {
        matches!(self, SearchError::ParseError(_))
    }

    /// Whether aggressive mode may try the same provider again
    pub fn is_retryable(&self) -> bool {
        self.is_transport() || self.is_format()
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SearchError::Timeout {
                timeout_ms: crate::utils::http::DEFAULT_TIMEOUT_MS,
            }
        } else if error.is_decode() {
            SearchError::ParseError(format!("Failed to decode response body: {error}"))
        } else if error.is_status() {
            let status_code = error.status().map(|s| s.as_u16());
            let message = error.to_string();

            if let Some(401 | 403) = status_code {
                SearchError::AuthenticationError(message)
            } else if let Some(429) = status_code {
                SearchError::RateLimit(message)
            } else {
                SearchError::HttpError {
                    message,
                    status_code,
                    response_body: None,
                }
            }
        } else {
            SearchError::HttpError {
                message: error.to_string(),
                status_code: None,
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::InvalidInput(format!("Invalid URL: {error}"))
    }
}

impl From<std::io::Error> for SearchError {
    fn from(error: std::io::Error) -> Self {
        SearchError::Other(format!("IO error: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_engine_message_lists_valid_engines() {
        let error = SearchError::UnsupportedEngine {
            provider: "mullvad".to_string(),
            engine: "bing".to_string(),
            supported: vec!["google".to_string(), "brave".to_string()],
        };

        let message = error.to_string();
        assert!(message.contains("'bing'"));
        assert!(message.contains("mullvad"));
        assert!(message.contains("google, brave"));
    }

    #[test]
    fn test_retry_classification() {
        let http = SearchError::HttpError {
            message: "boom".to_string(),
            status_code: Some(502),
            response_body: None,
        };
        assert!(http.is_transport());
        assert!(http.is_retryable());

        let timeout = SearchError::Timeout { timeout_ms: 10 };
        assert!(timeout.is_retryable());

        let parse = SearchError::ParseError("bad".to_string());
        assert!(parse.is_format());
        assert!(parse.is_retryable());

        let unsupported = SearchError::UnsupportedEngine {
            provider: "p".to_string(),
            engine: "e".to_string(),
            supported: vec![],
        };
        assert!(!unsupported.is_retryable());
        assert!(!SearchError::Cancelled.is_retryable());
    }

    #[test]
    fn test_json_error_becomes_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(SearchError::from(err), SearchError::ParseError(_)));
    }
}
