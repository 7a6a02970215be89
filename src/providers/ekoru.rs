//! Ekoru provider (campaign gateway JSON)

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
use uuid::Uuid;

const ENGINES: &[&str] = &["web"];

/// Location of the organic result list inside the gateway response
const ORGANIC_PATH: &str = "/pages/1/cbResults/organic";

const PUBLISHER_ID: &str = "E78C989916C6";
const SDK_VERSION: &str = "2.81.1";
/// Base64 of `https://www.ekoru.org/`
const CDM: &str = "aHR0cHM6Ly93d3cuZWtvcnUub3JnLw==";

/// Ekoru configuration
#[derive(Debug, Clone)]
pub struct EkoruConfig {
    /// Campaign gateway endpoint
    pub base_url: String,
    /// Site the gateway believes it is serving
    pub site_url: String,
}

impl Default for EkoruConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hs.qacono.com/v2/campaigns".to_string(),
            site_url: "https://www.ekoru.org/".to_string(),
        }
    }
}

/// Ekoru search provider
#[derive(Debug)]
pub struct EkoruProvider {
    config: EkoruConfig,
    http_client: HttpClient,
}

impl EkoruProvider {
    pub fn new() -> Self {
        Self::with_config(EkoruConfig::default())
    }

    pub fn with_config(config: EkoruConfig) -> Self {
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

    /// Form body the gateway expects; every call gets fresh session ids
    fn build_form(&self, query: &str) -> SearchResult<http::Params> {
        let page_load_uuid = Uuid::new_v4().to_string();
        let group_id = Uuid::new_v4().to_string();

        let publisher_url = http::build_url(&self.config.site_url, &[("q", query)])?;
        let gateway_query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();

        Ok(vec![
            ("publisherId", PUBLISHER_ID.to_string()),
            ("publisherURL", publisher_url),
            ("pageLoadUUID", page_load_uuid),
            ("groupId", group_id.clone()),
            ("cdm", CDM.to_string()),
            ("demandType", "serpGateway".to_string()),
            ("page[current]", "1".to_string()),
            ("page[next]", "1".to_string()),
            ("page[nextRequestToken]", String::new()),
            ("qc[0]", "Search".to_string()),
            ("searchTerm", query.to_string()),
            ("sdkver", SDK_VERSION.to_string()),
            ("fri", group_id),
            ("s", "-1".to_string()),
            ("feedsResults[adsMainline]", "6".to_string()),
            ("feedsResults[organic]", "8".to_string()),
            ("feedsResults[related]", "8".to_string()),
            ("adUnitId", String::new()),
            ("gatewayQueryString", gateway_query),
            ("kwds[0]", query.to_string()),
        ])
    }

    /// Extract organic results from a gateway response.
    ///
    /// Any missing step on the way to the organic list means no results;
    /// only a payload that is not a JSON object at all is an error.
    pub fn parse_response(payload: &Value) -> SearchResult<Vec<SearchResultType>> {
        if !payload.is_object() {
            return Err(SearchError::ParseError(
                "Ekoru response is not a JSON object".to_string(),
            ));
        }

        let Some(organic) = payload.pointer(ORGANIC_PATH).and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let results = organic
            .iter()
            .filter_map(Value::as_object)
            .map(|item| {
                let field = |name: &str| item.get(name).and_then(Value::as_str);

                SearchResultType::new(
                    http::clean_text(field("title").unwrap_or(NO_TITLE)),
                    field("url").unwrap_or_default().trim(),
                    http::clean_text(field("description").unwrap_or(NO_DESCRIPTION)),
                )
            })
            .collect();

        Ok(results)
    }
}

impl Default for EkoruProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for EkoruProvider {
    fn name(&self) -> &str {
        "ekoru"
    }

    fn supported_engines(&self) -> &[&'static str] {
        ENGINES
    }

    async fn search(&self, options: &SearchOptions) -> SearchResult<Vec<SearchResultType>> {
        self.resolve_engine(options)?;

        let form_data = self.build_form(&options.query)?;
        let origin = self.config.site_url.trim_end_matches('/').to_string();
        let headers = vec![
            ("User-Agent", BROWSER_USER_AGENT.to_string()),
            ("Accept", "application/json, text/plain, */*".to_string()),
            ("Origin", origin),
            ("Referer", self.config.site_url.clone()),
        ];

        debug::log_request(
            &options.debug,
            "Ekoru request",
            &format!("query: {}", options.query),
        );

        let payload = self
            .http_client
            .post_form_json_with_headers(
                &self.config.base_url,
                &form_data,
                headers,
                options.timeout,
            )
            .await?;

        let results = Self::parse_response(&payload)?;

        debug::log_response(
            &options.debug,
            &format!("Ekoru returned {} results", results.len()),
        );

        Ok(results)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config.insert("site_url".to_string(), self.config.site_url.clone());
        config
    }
}
