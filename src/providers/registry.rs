//! Name → provider lookup table

use crate::{
    error::{SearchError, SearchResult},
    providers::{EkoruProvider, ExciteProvider, MullvadProvider, PrivacyWallProvider},
    types::SearchProvider,
};
use std::fmt;
use std::sync::Arc;

/// Builds a fresh provider instance
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn SearchProvider> + Send + Sync>;

/// Registry of providers addressable by id, in registration order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<(String, ProviderFactory)>,
}

impl ProviderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider
    pub fn with_defaults() -> Self {
        Self::new()
            .register("mullvad", || Box::new(MullvadProvider::new()))
            .register("ekoru", || Box::new(EkoruProvider::new()))
            .register("excite", || Box::new(ExciteProvider::new()))
            .register("privacywall", || Box::new(PrivacyWallProvider::new()))
    }

    /// Add (or replace) a provider factory under `id`
    pub fn register<F>(mut self, id: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SearchProvider> + Send + Sync + 'static,
    {
        let factory: ProviderFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(name, _)| name == id) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((id.to_string(), factory)),
        }
        self
    }

    pub fn list_provider_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiate the provider registered under `id`
    pub fn load(&self, id: &str) -> SearchResult<Box<dyn SearchProvider>> {
        self.entries
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, factory)| factory())
            .ok_or_else(|| SearchError::ProviderNotFound {
                name: id.to_string(),
                available: self.list_provider_ids(),
            })
    }

    /// Instantiate a subset of providers, failing on the first unknown id
    pub fn load_many(&self, ids: &[String]) -> SearchResult<Vec<Box<dyn SearchProvider>>> {
        ids.iter().map(|id| self.load(id)).collect()
    }

    /// Instantiate every registered provider
    pub fn load_all(&self) -> Vec<Box<dyn SearchProvider>> {
        self.entries.iter().map(|(_, factory)| factory()).collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list_provider_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_providers() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(
            registry.list_provider_ids(),
            vec!["mullvad", "ekoru", "excite", "privacywall"]
        );

        for id in registry.list_provider_ids() {
            let provider = registry.load(&id).unwrap();
            assert_eq!(provider.name(), id);
            assert!(!provider.supported_engines().is_empty());
        }
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::with_defaults();
        match registry.load("altavista").unwrap_err() {
            SearchError::ProviderNotFound { name, available } => {
                assert_eq!(name, "altavista");
                assert_eq!(available.len(), 4);
            }
            other => panic!("Expected ProviderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_register_replaces_existing_id() {
        let registry = ProviderRegistry::new()
            .register("web", || Box::new(ExciteProvider::new()))
            .register("web", || Box::new(PrivacyWallProvider::new()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.load("web").unwrap().name(), "privacywall");
    }

    #[test]
    fn test_load_many_keeps_order() {
        let registry = ProviderRegistry::with_defaults();
        let ids = vec!["excite".to_string(), "mullvad".to_string()];
        let names: Vec<_> = registry
            .load_many(&ids)
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["excite", "mullvad"]);

        assert!(registry.load_many(&["nope".to_string()]).is_err());
    }
}
