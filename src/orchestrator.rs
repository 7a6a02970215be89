//! Aggressive search: retry and fail over across providers until one answers

use crate::{
    error::{SearchError, SearchResult as Result},
    providers::ProviderRegistry,
    types::{SearchOptions, SearchProvider, SearchResult},
    utils::debug,
};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;

/// How hard to push each provider before moving on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per provider before it is exhausted
    pub max_retries_per_provider: u32,
    /// Pause between two attempts on the same provider
    pub backoff: Duration,
    /// Upper bound for a single provider call
    pub timeout_per_attempt: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries_per_provider: 3,
            backoff: Duration::from_millis(500),
            timeout_per_attempt: Duration::from_secs(15),
        }
    }
}

/// Configuration for aggressive searches
#[derive(Debug, Default)]
pub struct AggressiveSearchConfig {
    pub providers: Vec<Box<dyn SearchProvider>>,
    pub policy: RetryPolicy,
    /// Provider to try first, usually the configured one
    pub preferred_provider: Option<String>,
}

impl AggressiveSearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from every provider in `registry`
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        Self {
            providers: registry.load_all(),
            ..Self::default()
        }
    }

    pub fn add_provider(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.policy.max_retries_per_provider = max;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.policy.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.policy.timeout_per_attempt = timeout;
        self
    }

    pub fn with_preferred_provider(mut self, name: impl Into<String>) -> Self {
        self.preferred_provider = Some(name.into());
        self
    }
}

/// Why a provider was given up on
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: String,
    pub engine: String,
    pub attempts: u32,
    /// Last error seen; `None` when every attempt came back empty
    pub last_error: Option<SearchError>,
}

/// Final state of an aggressive search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// First provider that produced at least one result
    Success {
        results: Vec<SearchResult>,
        provider: String,
        engine: String,
        attempts: u32,
    },
    /// Every provider was tried without success
    Exhausted { attempted: Vec<ProviderFailure> },
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Success { .. })
    }

    /// Results of a successful search; empty when exhausted
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Success { results, .. } => results,
            SearchOutcome::Exhausted { .. } => &[],
        }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            SearchOutcome::Success { results, .. } => results,
            SearchOutcome::Exhausted { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProviderStats {
    pub total_attempts: u64,
    pub successful_attempts: u64,
    pub empty_attempts: u64,
    pub failed_attempts: u64,
    pub avg_response_time_ms: f64,
}

/// Aggressive search manager
pub struct AggressiveSearch {
    config: AggressiveSearchConfig,
    provider_stats: HashMap<String, ProviderStats>,
}

impl AggressiveSearch {
    pub fn new(config: AggressiveSearchConfig) -> Self {
        let provider_stats = config
            .providers
            .iter()
            .map(|p| (p.name().to_string(), ProviderStats::default()))
            .collect();

        Self {
            config,
            provider_stats,
        }
    }

    /// Run an aggressive search that cannot be cancelled from outside
    pub async fn search(&mut self, options: &SearchOptions) -> Result<SearchOutcome> {
        self.search_with_cancellation(options, &CancellationToken::new())
            .await
    }

    /// Run an aggressive search, stopping as soon as `cancel` fires.
    ///
    /// Empty result sets and retryable errors are retried on the same
    /// provider up to the policy cap; anything else exhausts the provider at
    /// once. The first non-empty result set wins.
    pub async fn search_with_cancellation(
        &mut self,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome> {
        if options.query.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "A search query is required".to_string(),
            ));
        }

        let max_attempts = self.config.policy.max_retries_per_provider.max(1);
        let mut remaining: Vec<usize> = (0..self.config.providers.len()).collect();
        let mut attempted = Vec::new();

        let mut current = self
            .config
            .preferred_provider
            .as_deref()
            .and_then(|name| self.config.providers.iter().position(|p| p.name() == name))
            .or_else(|| pick_candidate(&remaining));

        while let Some(index) = current {
            remaining.retain(|&i| i != index);

            let provider_name = self.config.providers[index].name().to_string();
            let engine = engine_for(self.config.providers[index].as_ref(), options);
            let attempt_options = SearchOptions {
                engine: Some(engine.clone()),
                ..options.clone()
            };

            let mut attempts = 0;
            let mut last_error: Option<SearchError>;

            loop {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }

                attempts += 1;
                debug::log(
                    &options.debug,
                    "Aggressive search attempt",
                    &format!("{provider_name} ({engine}) - attempt {attempts}/{max_attempts}"),
                );

                match self.attempt(index, &attempt_options, cancel).await {
                    Ok(results) if !results.is_empty() => {
                        log::info!(
                            "Aggressive search succeeded with {provider_name} ({engine}) after {attempts} attempt(s)"
                        );
                        return Ok(SearchOutcome::Success {
                            results,
                            provider: provider_name,
                            engine,
                            attempts,
                        });
                    }
                    Ok(_) => {
                        log::info!("{provider_name} ({engine}) returned no results");
                        last_error = None;
                    }
                    Err(SearchError::Cancelled) => return Err(SearchError::Cancelled),
                    Err(err) if !err.is_retryable() => {
                        log::warn!("Giving up on {provider_name}: {err}");
                        last_error = Some(err);
                        break;
                    }
                    Err(err) => {
                        log::warn!("Error with provider {provider_name}: {err}");
                        last_error = Some(err);
                    }
                }

                if attempts >= max_attempts {
                    break;
                }

                tokio::select! {
                    _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                    _ = sleep(self.config.policy.backoff) => {}
                }
            }

            attempted.push(ProviderFailure {
                provider: provider_name,
                engine,
                attempts,
                last_error,
            });

            current = pick_candidate(&remaining);
        }

        log::warn!(
            "Aggressive search exhausted {} provider(s) without results",
            attempted.len()
        );
        Ok(SearchOutcome::Exhausted { attempted })
    }

    /// One bounded call to one provider, recorded in the stats
    async fn attempt(
        &mut self,
        provider_index: usize,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let start_time = std::time::Instant::now();
        let provider = &self.config.providers[provider_index];
        let provider_name = provider.name().to_string();
        let limit = self.config.policy.timeout_per_attempt;

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            result = timeout(limit, provider.search(options)) => match result {
                Ok(search_result) => search_result,
                Err(_) => Err(SearchError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
        };

        let duration = start_time.elapsed();

        if let Some(stats) = self.provider_stats.get_mut(&provider_name) {
            stats.total_attempts += 1;
            match &result {
                Ok(results) if !results.is_empty() => {
                    stats.successful_attempts += 1;
                    let new_time = duration.as_millis() as f64;
                    stats.avg_response_time_ms = (stats.avg_response_time_ms
                        * (stats.successful_attempts - 1) as f64
                        + new_time)
                        / stats.successful_attempts as f64;
                }
                Ok(_) => stats.empty_attempts += 1,
                Err(_) => stats.failed_attempts += 1,
            }
        }

        result
    }

    /// Get provider statistics
    pub fn get_stats(&self) -> &HashMap<String, ProviderStats> {
        &self.provider_stats
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.config.policy
    }
}

/// Requested engine when the provider has it, otherwise its default
fn engine_for(provider: &dyn SearchProvider, options: &SearchOptions) -> String {
    match options.engine.as_deref() {
        Some(engine) if provider.supports_engine(engine) => engine.to_string(),
        _ => provider.default_engine().to_string(),
    }
}

/// Uniformly random pick among untried providers
fn pick_candidate(remaining: &[usize]) -> Option<usize> {
    remaining.choose(&mut rand::thread_rng()).copied()
}
