//! Provider registry.
//!
//! The [`Registry`] holds registered providers keyed by identifier. It is
//! built once at startup and shared by reference (`Arc<Registry>`) with every
//! aggregator invocation; there is no process-wide default instance.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::provider::Provider;
use crate::providers::{DoutubProvider, DouyinProvider, SougouProvider};
use crate::types::ProviderDescriptor;

/// Registry of available providers.
///
/// Registration takes `&self` so providers can be added while other
/// threads read; the last registration for an identifier wins.
#[derive(Default)]
pub struct Registry {
    providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in providers.
    ///
    /// `sougou` and `doutub` are always registered; `douyin` only when a
    /// cookie is configured.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Config`] if `config` is invalid or an
    /// HTTP client cannot be built from it.
    pub fn with_builtin_providers(config: &SourcesConfig) -> Result<Self> {
        config.validate()?;
        let registry = Self::new();
        registry.register(Arc::new(SougouProvider::new(config)?));
        registry.register(Arc::new(DoutubProvider::new(config)?));
        if let Some(cookie) = config.douyin_cookie.as_deref().filter(|c| !c.is_empty()) {
            registry.register(Arc::new(DouyinProvider::new(config, cookie)?));
        }
        tracing::debug!(count = registry.len(), "built-in providers registered");
        Ok(registry)
    }

    /// Register a provider. Replaces any existing provider with the same id.
    pub fn register(&self, provider: Arc<dyn Provider>) {
        let id = provider.id().to_string();
        let mut map = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if map.insert(id.clone(), provider).is_some() {
            tracing::debug!(provider = %id, "provider registration replaced");
        }
    }

    /// Get a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Snapshot of all registered providers, in no particular order.
    pub fn list(&self) -> Vec<Arc<dyn Provider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Identifiers of all registered providers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Descriptors of all registered providers, sorted by id.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        let mut descriptors: Vec<ProviderDescriptor> =
            self.list().iter().map(|p| p.descriptor()).collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("providers", &self.ids()).finish()
    }
}
