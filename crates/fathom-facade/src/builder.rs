//! `SmartBrowserBuilder`: chainable construction of a [`SmartBrowser`].
//!
//! Grounded on `riptide_facade::builder::CrawlFacadeBuilder`: every
//! collaborator is optional and gets a sensible default, the caller only
//! overrides what it cares about, and `build()` does the actual wiring
//! (spawning the learning consumer, restoring persisted state) in one place.

use crate::browser::SmartBrowser;
use fathom_adapters::{IntelligenceAdapter, LightweightAdapter, PlaywrightAdapter};
use fathom_discovery::{DiscoveryOrchestrator, LiveRequestGate};
use fathom_fetcher::TieredFetcher;
use fathom_learning::{Embedder, LearningAggregator};
use fathom_patterns::PatternRegistry;
use fathom_persistence::PersistedStore;
use fathom_predictor::Predictor;
use fathom_types::{DomainHintMap, FathomConfig, RenderAdapter, Result, Tier, VectorStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Where to persist learned state, if at all. `None` (the default) keeps
/// everything in memory for the life of the process.
pub struct PersistenceConfig {
    pub data_dir: PathBuf,
}

#[derive(Default)]
pub struct SmartBrowserBuilder {
    config: FathomConfig,
    adapters: HashMap<Tier, Arc<dyn RenderAdapter>>,
    vector: Option<Arc<dyn VectorStore>>,
    embedder: Option<Arc<dyn Embedder>>,
    discovery_enabled: bool,
    persistence: Option<PersistenceConfig>,
}

impl SmartBrowserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the whole configuration tree (spec.md §6.3), in place of
    /// individually loading `FathomConfig::from_env()`.
    pub fn with_config(mut self, config: FathomConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers (or replaces) the adapter for one tier. The three standard
    /// tiers get their default implementation if never overridden.
    pub fn with_adapter(mut self, tier: Tier, adapter: Arc<dyn RenderAdapter>) -> Self {
        self.adapters.insert(tier, adapter);
        self
    }

    /// Supplies a vector store and the embedder that feeds it (spec.md
    /// §4.3); without both, `getLearningStats().vector_count` stays zero
    /// and no embeddings are recorded.
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        self.vector = Some(store);
        self.embedder = Some(embedder);
        self
    }

    /// Turns on the background discovery sweep (spec.md §4.6). Off by
    /// default: probing third-party domains without being asked is not
    /// something a library should do silently.
    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discovery_enabled = enabled;
        self
    }

    /// Enables debounced JSON persistence of learned patterns and change
    /// predictions under `data_dir` (spec.md §6.2), loading any existing
    /// state at [`Self::build`] time.
    pub fn with_persistence(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.persistence = Some(PersistenceConfig { data_dir: data_dir.into() });
        self
    }

    /// Assembles every component and spawns the learning consumer task.
    /// Async because persisted state, if configured, is loaded from disk
    /// before the registry and predictor start serving requests.
    pub async fn build(mut self) -> Result<SmartBrowser> {
        let registry = Arc::new(PatternRegistry::new());
        let predictor = Arc::new(Predictor::new(self.config.predictor.clone()));
        let hints = Arc::new(DomainHintMap::new());

        let mut patterns_store = None;
        let mut predictor_store = None;
        if let Some(persistence) = &self.persistence {
            std::fs::create_dir_all(&persistence.data_dir).map_err(|e| {
                fathom_types::FathomError::Internal(format!("creating persistence dir: {e}"))
            })?;

            let p_store = Arc::new(PersistedStore::new(
                persistence.data_dir.join("learned-patterns.json"),
                Duration::from_millis(self.config.registry.persist_debounce_ms),
            ));
            if let Some(saved) = p_store.load().await? {
                registry.restore(saved);
            }

            let c_store = Arc::new(PersistedStore::new(
                persistence.data_dir.join("change-predictions.json"),
                Duration::from_millis(self.config.registry.persist_debounce_ms),
            ));
            if let Some(saved) = c_store.load().await? {
                predictor.restore(saved);
            }

            patterns_store = Some(p_store);
            predictor_store = Some(c_store);
        }

        let (learning_tx, learning_rx) = mpsc::unbounded_channel();

        let mut aggregator = LearningAggregator::new(registry.clone(), predictor.clone(), hints.clone());
        if let (Some(p), Some(c)) = (patterns_store, predictor_store) {
            aggregator = aggregator.with_persistence(p, c);
        }
        if let (Some(vector), Some(embedder)) = (&self.vector, &self.embedder) {
            aggregator = aggregator.with_vector_store(vector.clone(), embedder.clone());
        }
        let learning_task = Arc::new(Arc::new(aggregator).spawn(learning_rx));

        self.adapters.entry(Tier::Intelligence).or_insert_with(|| {
            Arc::new(IntelligenceAdapter::new(registry.clone())) as Arc<dyn RenderAdapter>
        });
        self.adapters
            .entry(Tier::Lightweight)
            .or_insert_with(|| Arc::new(LightweightAdapter::new()) as Arc<dyn RenderAdapter>);
        self.adapters
            .entry(Tier::Playwright)
            .or_insert_with(|| Arc::new(PlaywrightAdapter) as Arc<dyn RenderAdapter>);

        let fetcher = Arc::new(
            TieredFetcher::new(self.adapters, registry.clone(), hints, self.config.fetcher.clone())
                .with_learning_sender(learning_tx.clone()),
        );

        let live_gate = LiveRequestGate::new();
        let discovery = if self.discovery_enabled {
            Some(Arc::new(DiscoveryOrchestrator::new(
                self.config.discovery.clone(),
                learning_tx,
                live_gate.clone(),
            )))
        } else {
            None
        };

        Ok(SmartBrowser {
            fetcher,
            registry,
            predictor,
            vector: self.vector,
            discovery,
            live_gate,
            _learning_task: learning_task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_defaults_and_no_persistence() {
        let browser = SmartBrowserBuilder::new().build().await.unwrap();
        let stats = browser.get_learning_stats().await.unwrap();
        assert_eq!(stats.registry_count, 0);
        assert_eq!(stats.predictor_count, 0);
        assert_eq!(stats.vector_count, 0);
    }

    #[tokio::test]
    async fn persistence_dir_is_created_and_empty_state_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let browser = SmartBrowserBuilder::new()
            .with_persistence(dir.path())
            .build()
            .await
            .unwrap();
        assert_eq!(browser.get_domain_intelligence("example.com").known_patterns, 0);
    }
}
