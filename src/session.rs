//! Search session: the current provider, engine and mode, plus how to search with them

use crate::{
    config::Config,
    error::{SearchError, SearchResult as Result},
    orchestrator::{AggressiveSearch, AggressiveSearchConfig, RetryPolicy, SearchOutcome},
    providers::ProviderRegistry,
    types::{DebugOptions, SearchOptions, SearchProvider, SearchResult},
    utils::http::DEFAULT_TIMEOUT_MS,
    web_search,
};
use std::fmt;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a session search produced
#[derive(Debug, Clone)]
pub enum SessionSearch {
    /// Single call to the current provider
    Direct {
        provider: String,
        engine: String,
        results: Vec<SearchResult>,
    },
    /// Failover search across every registered provider
    Aggressive(SearchOutcome),
}

impl SessionSearch {
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SessionSearch::Direct { results, .. } => results,
            SessionSearch::Aggressive(outcome) => outcome.results(),
        }
    }

    /// Provider and engine that produced the results, if any did
    pub fn source(&self) -> Option<(&str, &str)> {
        match self {
            SessionSearch::Direct {
                provider, engine, ..
            }
            | SessionSearch::Aggressive(SearchOutcome::Success {
                provider, engine, ..
            }) => Some((provider.as_str(), engine.as_str())),
            SessionSearch::Aggressive(SearchOutcome::Exhausted { .. }) => None,
        }
    }
}

/// Mutable search state owned by the front end
pub struct Session {
    registry: ProviderRegistry,
    provider_id: String,
    provider: Box<dyn SearchProvider>,
    engine: String,
    aggressive: bool,
    /// Engine from the config that the provider did not offer
    engine_fallback: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub timeout_ms: u64,
    pub policy: RetryPolicy,
    pub debug: Option<DebugOptions>,
}

impl Session {
    /// Build a session from stored preferences.
    ///
    /// An unknown provider falls back to the first registered one and an
    /// engine the provider lacks falls back to its default; see
    /// [`Session::engine_fallback`].
    pub fn from_config(registry: ProviderRegistry, config: &Config) -> Result<Self> {
        let provider_id = if registry.contains(&config.provider) {
            config.provider.clone()
        } else {
            let first = registry.list_provider_ids().into_iter().next().ok_or_else(|| {
                SearchError::ConfigError("No search providers registered".to_string())
            })?;
            log::warn!(
                "Configured provider '{}' is not available, using '{first}'",
                config.provider
            );
            first
        };

        let provider = registry.load(&provider_id)?;
        let (engine, engine_fallback) = if provider.supports_engine(&config.engine) {
            (config.engine.clone(), None)
        } else {
            (
                provider.default_engine().to_string(),
                Some(config.engine.clone()),
            )
        };

        Ok(Self {
            registry,
            provider_id,
            provider,
            engine,
            aggressive: config.aggressive_mode,
            engine_fallback,
            country: None,
            language: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            policy: RetryPolicy::default(),
            debug: None,
        })
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn provider(&self) -> &dyn SearchProvider {
        self.provider.as_ref()
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn is_aggressive(&self) -> bool {
        self.aggressive
    }

    /// Requested engine that was replaced by the provider default, if any
    pub fn engine_fallback(&self) -> Option<&str> {
        self.engine_fallback.as_deref()
    }

    /// Switch provider; the engine resets to the new provider's default
    pub fn set_provider(&mut self, id: &str) -> Result<()> {
        let provider = self.registry.load(id)?;
        self.engine = provider.default_engine().to_string();
        self.provider = provider;
        self.provider_id = id.to_string();
        self.engine_fallback = None;
        Ok(())
    }

    pub fn set_engine(&mut self, engine: &str) -> Result<()> {
        let options = SearchOptions::default().with_engine(engine);
        self.engine = self.provider.resolve_engine(&options)?;
        self.engine_fallback = None;
        Ok(())
    }

    pub fn set_aggressive(&mut self, aggressive: bool) {
        self.aggressive = aggressive;
    }

    /// Flip aggressive mode, returning the new state
    pub fn toggle_aggressive(&mut self) -> bool {
        self.aggressive = !self.aggressive;
        self.aggressive
    }

    fn options(&self, query: &str) -> SearchOptions {
        SearchOptions {
            query: query.to_string(),
            engine: Some(self.engine.clone()),
            country: self.country.clone(),
            language: self.language.clone(),
            timeout: Some(self.timeout_ms),
            debug: self.debug.clone(),
        }
    }

    /// Search with the current settings until done or `cancel` fires
    pub async fn search(&self, query: &str, cancel: &CancellationToken) -> Result<SessionSearch> {
        let options = self.options(query);

        if self.aggressive {
            let policy = RetryPolicy {
                timeout_per_attempt: Duration::from_millis(self.timeout_ms),
                ..self.policy.clone()
            };
            let config = AggressiveSearchConfig::from_registry(&self.registry)
                .with_policy(policy)
                .with_preferred_provider(self.provider_id.clone());

            let outcome = AggressiveSearch::new(config)
                .search_with_cancellation(&options, cancel)
                .await?;
            return Ok(SessionSearch::Aggressive(outcome));
        }

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            results = web_search(self.provider.as_ref(), &options) => results?,
        };

        Ok(SessionSearch::Direct {
            provider: self.provider_id.clone(),
            engine: self.engine.clone(),
            results,
        })
    }

    /// Current settings in their persisted form
    pub fn to_config(&self) -> Config {
        Config {
            provider: self.provider_id.clone(),
            engine: self.engine.clone(),
            aggressive_mode: self.aggressive,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider_id)
            .field("engine", &self.engine)
            .field("aggressive", &self.aggressive)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
