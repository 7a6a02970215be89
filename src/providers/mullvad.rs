//! Mullvad Leta provider
//!
//! Leta answers with `{"data": "<json>"}`. The inner document is a flat
//! array that doubles as a lookup table: position 0 is a header whose
//! `items` field points at an array of item positions, and every item is an
//! object whose `link`/`title`/`snippet` fields point at the strings.
//!
//! ```text
//! [{"items":1}, [2], {"link":3,"title":4,"snippet":5}, "http://x", "T", "S"]
//! ```

use crate::{
    error::{SearchError, SearchResult},
    types::{
        SearchOptions, SearchProvider, SearchResult as SearchResultType, NO_DESCRIPTION, NO_TITLE,
    },
    utils::{
        debug,
        http::{self, HttpClient, BROWSER_USER_AGENT},
    },
};
use serde_json::Value;
use std::collections::HashMap;

const ENGINES: &[&str] = &["google", "brave"];

/// Mullvad Leta configuration
#[derive(Debug, Clone)]
pub struct MullvadConfig {
    /// Leta endpoint; the query is appended as `?q=`
    pub base_url: String,
    /// Value sent as `Origin`
    pub origin: String,
}

impl Default for MullvadConfig {
    fn default() -> Self {
        Self {
            base_url: "https://leta.mullvad.net/".to_string(),
            origin: "https://leta.mullvad.net".to_string(),
        }
    }
}

/// Mullvad Leta search provider (Google and Brave backends)
#[derive(Debug)]
pub struct MullvadProvider {
    config: MullvadConfig,
    http_client: HttpClient,
}

impl MullvadProvider {
    pub fn new() -> Self {
        Self::with_config(MullvadConfig::default())
    }

    pub fn with_config(config: MullvadConfig) -> Self {
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

    /// Turn a decoded Leta response into results
    pub fn parse_response(payload: &Value) -> SearchResult<Vec<SearchResultType>> {
        let cells = decode_table(payload)?;
        IndexedTable::new(&cells).records()
    }
}

impl Default for MullvadProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for MullvadProvider {
    fn name(&self) -> &str {
        "mullvad"
    }

    fn supported_engines(&self) -> &[&'static str] {
        ENGINES
    }

    async fn search(&self, options: &SearchOptions) -> SearchResult<Vec<SearchResultType>> {
        let engine = self.resolve_engine(options)?;

        let request_url =
            http::build_url(&self.config.base_url, &[("q", options.query.as_str())])?;

        let form_data = vec![
            ("q", options.query.clone()),
            ("engine", engine.clone()),
            ("country", options.country.clone().unwrap_or_default()),
            ("language", options.language.clone().unwrap_or_default()),
            ("lastUpdated", String::new()),
        ];

        let headers = vec![
            ("User-Agent", BROWSER_USER_AGENT.to_string()),
            ("Accept", "application/json".to_string()),
            ("Referer", request_url.clone()),
            ("Origin", self.config.origin.clone()),
        ];

        debug::log_request(
            &options.debug,
            "Mullvad Leta request",
            &format!("url: {request_url}, engine: {engine}"),
        );

        let payload = self
            .http_client
            .post_form_json_with_headers(&request_url, &form_data, headers, options.timeout)
            .await?;

        let results = Self::parse_response(&payload)?;

        debug::log_response(
            &options.debug,
            &format!("Mullvad Leta returned {} results", results.len()),
        );

        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config.insert("engines".to_string(), ENGINES.join(","));
        config
    }
}

/// Unwrap `{"data": "<json>"}` into the table cells
fn decode_table(payload: &Value) -> SearchResult<Vec<Value>> {
    let data = payload
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SearchError::ParseError("Leta response has no string 'data' field".to_string())
        })?;

    match serde_json::from_str::<Value>(data)? {
        Value::Array(cells) => Ok(cells),
        other => Err(SearchError::ParseError(format!(
            "Leta 'data' should decode to an array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read-only view over a pointer table.
///
/// Every dereference is bounds- and type-checked; a bad pointer yields
/// `None` and never aborts the whole table.
#[derive(Debug, Clone, Copy)]
struct IndexedTable<'a> {
    cells: &'a [Value],
}

impl<'a> IndexedTable<'a> {
    fn new(cells: &'a [Value]) -> Self {
        Self { cells }
    }

    /// Follow an integer pointer
    fn deref(&self, pointer: &Value) -> Option<&'a Value> {
        let index = usize::try_from(pointer.as_u64()?).ok()?;
        self.cells.get(index)
    }

    /// Follow an optional pointer field to a string
    fn string_at(&self, pointer: Option<&Value>) -> Option<&'a str> {
        pointer.and_then(|p| self.deref(p)).and_then(Value::as_str)
    }

    /// Positions of the item objects, as listed by the header
    fn item_pointers(&self) -> SearchResult<&'a [Value]> {
        let header = self
            .cells
            .first()
            .and_then(Value::as_object)
            .ok_or_else(|| {
                SearchError::ParseError("Leta table has no header object".to_string())
            })?;

        let items = header.get("items").filter(|v| v.is_u64()).ok_or_else(|| {
            SearchError::ParseError("Leta header 'items' is missing or not an index".to_string())
        })?;

        // A dangling items pointer means the page simply has nothing to show
        Ok(self
            .deref(items)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    fn records(&self) -> SearchResult<Vec<SearchResultType>> {
        let results = self
            .item_pointers()?
            .iter()
            .filter_map(|pointer| self.record(pointer))
            .collect();

        Ok(results)
    }

    fn record(&self, pointer: &Value) -> Option<SearchResultType> {
        let item = self.deref(pointer)?.as_object()?;

        if !item.contains_key("link") || !item.contains_key("title") {
            return None;
        }

        let link = self.string_at(item.get("link")).unwrap_or_default();
        let title = self.string_at(item.get("title")).unwrap_or(NO_TITLE);
        let snippet = self.string_at(item.get("snippet")).unwrap_or(NO_DESCRIPTION);

        Some(SearchResultType::new(
            http::clean_text(title),
            link.trim(),
            http::clean_text(snippet),
        ))
    }
}
