//! C9: the Learning Engine. Single consumer of `LearningEvent`s emitted by
//! `fathom-fetcher` (C8); the only component that mutates the pattern
//! registry (C4), the predictor (C5) and the vector store (C2) — per
//! spec.md §4.1/§9 "cyclic references avoided, Learning Engine is the only
//! component that mutates registry, predictor, and vector store".
//!
//! Grounded on `riptide-events::bus::EventBus`'s single-task-drains-a-channel
//! shape, simplified: one consumer, no handler registry or routing table,
//! because spec.md names exactly one sink for these events.

use crate::embed::Embedder;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fathom_patterns::{ApplyOutcome, LearnedApiPattern, PatternEvent, PatternRegistry};
use fathom_persistence::PersistedStore;
use fathom_predictor::{ChangeObservation, ContentChangePattern, Predictor};
use fathom_types::{DomainHintMap, LearningEvent, Tier, VectorStore};
use fathom_vector::{EmbeddingRecordBuilder, EntityType};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

type HashKey = (String, String);

/// Aggregates `LearningEvent`s into registry/predictor/vector-store/hint-map
/// updates. Holds no per-request state; `last_hash` is the only thing it
/// accumulates across calls, and it is scoped to content-change diffing.
pub struct LearningAggregator {
    registry: Arc<PatternRegistry>,
    predictor: Arc<Predictor>,
    hints: Arc<DomainHintMap>,
    vector: Option<Arc<dyn VectorStore>>,
    embedder: Option<Arc<dyn Embedder>>,
    patterns_store: Option<Arc<PersistedStore<Vec<LearnedApiPattern>>>>,
    predictor_store: Option<Arc<PersistedStore<Vec<ContentChangePattern>>>>,
    last_hash: DashMap<HashKey, String>,
}

impl LearningAggregator {
    pub fn new(registry: Arc<PatternRegistry>, predictor: Arc<Predictor>, hints: Arc<DomainHintMap>) -> Self {
        Self {
            registry,
            predictor,
            hints,
            vector: None,
            embedder: None,
            patterns_store: None,
            predictor_store: None,
            last_hash: DashMap::new(),
        }
    }

    /// Wire in vector-store indexing of newly learned patterns. Without
    /// this, the aggregator still updates C4/C5; pattern embeddings simply
    /// aren't stored (spec.md §9 treats the embedding backend as a
    /// collaborator interface, not something this crate fabricates).
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        self.vector = Some(store);
        self.embedder = Some(embedder);
        self
    }

    /// Arm debounced persistence of the registry and predictor snapshots
    /// (spec.md §6.2 `learned-patterns.json` / `change-predictions.json`).
    /// Every handled event arms both debounce timers; `PersistedStore`
    /// itself coalesces repeated saves within the window.
    pub fn with_persistence(
        mut self,
        patterns_store: Arc<PersistedStore<Vec<LearnedApiPattern>>>,
        predictor_store: Arc<PersistedStore<Vec<ContentChangePattern>>>,
    ) -> Self {
        self.patterns_store = Some(patterns_store);
        self.predictor_store = Some(predictor_store);
        self
    }

    async fn persist(&self) {
        if let Some(store) = &self.patterns_store {
            store.save(self.registry.snapshot()).await;
        }
        if let Some(store) = &self.predictor_store {
            store.save(self.predictor.snapshot()).await;
        }
    }

    /// Spawn a task that drains `rx` until the producer side is dropped.
    pub fn spawn(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<LearningEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.handle(event, Utc::now()).await;
            }
            debug!("learning event channel closed, aggregator exiting");
        })
    }

    /// Process one event. Exposed alongside `spawn` so tests (and any
    /// caller not using a channel) can drive the aggregator directly.
    pub async fn handle(&self, event: LearningEvent, now: DateTime<Utc>) {
        match event {
            LearningEvent::Success { domain, url, tier, pattern_id, latency_ms, content_hash } => {
                self.handle_success(domain, url, tier, pattern_id, latency_ms, content_hash, now).await;
            }
            LearningEvent::Failure { domain, url, tier, pattern_id, reason } => {
                self.handle_failure(&domain, &url, tier, pattern_id, reason);
            }
            LearningEvent::ProbeSucceeded { domain, url, requires_auth, .. } => {
                self.handle_probe_succeeded(&domain, &url, requires_auth, now).await;
            }
        }
        self.persist().await;
    }

    /// spec.md §4.6: a successful discovery probe becomes a fuzzing-sourced
    /// pattern, same as a learned-from-traffic one but via
    /// `learn_from_probe` so it carries `source=fuzzing` and the fixed 0.8
    /// starting confidence instead of a single-observation one.
    async fn handle_probe_succeeded(&self, domain: &str, url: &str, requires_auth: bool, now: DateTime<Utc>) {
        let Ok(parsed) = Url::parse(url) else {
            warn!(%url, "could not parse probed url");
            return;
        };
        if let Some(PatternEvent::Learned { pattern_id, host }) =
            self.registry.learn_from_probe(&parsed, url, requires_auth)
        {
            debug!(%host, %pattern_id, "learned pattern from discovery probe");
            self.index_pattern(&pattern_id, domain, now).await;
        }
    }

    async fn handle_success(
        &self,
        domain: String,
        url: String,
        tier: Tier,
        pattern_id: Option<String>,
        latency_ms: f64,
        content_hash: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.hints.record_success(&domain, tier);

        let url_pattern = match &pattern_id {
            Some(id) => {
                self.registry.apply_pattern(id, ApplyOutcome::Success { latency_ms, domain: domain.clone() });
                self.registry.get(id).map(|p| p.url_pattern).unwrap_or_else(|| url.clone())
            }
            // spec.md §4.2 "Learning a new pattern": a lightweight/playwright
            // success on a host with no coverage is itself the learning
            // signal. Intelligence-tier successes never reach here with no
            // pattern_id since that tier validates against one directly.
            None if tier != Tier::Intelligence => {
                match Url::parse(&url) {
                    Ok(parsed) => match self.registry.learn(&parsed, &url) {
                        Some(PatternEvent::Learned { pattern_id: new_id, host }) => {
                            debug!(%host, pattern_id = %new_id, "learned new pattern from fetch");
                            self.index_pattern(&new_id, &domain, now).await;
                            url.clone()
                        }
                        _ => url.clone(),
                    },
                    Err(e) => {
                        warn!(%url, error = %e, "could not parse url for pattern learning");
                        url.clone()
                    }
                }
            }
            None => url.clone(),
        };

        self.record_content_change(&domain, &url_pattern, content_hash, now);
    }

    fn handle_failure(&self, domain: &str, url: &str, tier: Tier, pattern_id: Option<String>, reason: fathom_types::FailureReason) {
        self.hints.record_failure(domain, tier);
        if let Some(id) = pattern_id {
            self.registry.apply_pattern(&id, ApplyOutcome::Failure { reason });
        }
        debug!(%domain, %url, %tier, ?reason, "recorded fetch failure, no predictor update");
    }

    /// Diff the incoming content hash against the last one seen for this
    /// `(domain, url_pattern)` key and feed the result to the predictor. The
    /// first observation for a key is never "changed" — there's nothing to
    /// diff against yet.
    fn record_content_change(&self, domain: &str, url_pattern: &str, content_hash: Option<String>, now: DateTime<Utc>) {
        let Some(hash) = content_hash else { return };
        let key = (domain.to_string(), url_pattern.to_string());
        let changed = match self.last_hash.insert(key, hash.clone()) {
            Some(previous) => previous != hash,
            None => false,
        };
        self.predictor.record_observation(
            domain,
            url_pattern,
            ChangeObservation { checked_at: now, changed, content_hash: Some(hash) },
            now,
        );
    }

    async fn index_pattern(&self, pattern_id: &str, domain: &str, now: DateTime<Utc>) {
        let (Some(vector), Some(embedder)) = (&self.vector, &self.embedder) else { return };
        let Some(pattern) = self.registry.get(pattern_id) else { return };

        let text = format!("{} {} {:?}", pattern.host, pattern.url_pattern, pattern.template);
        let embedding = embedder.embed(&text);
        let record = EmbeddingRecordBuilder::new(
            format!("pattern:{pattern_id}"),
            embedding,
            embedder.model_name(),
            "v1",
            EntityType::Pattern,
            now,
        )
        .with_domain(domain)
        .with_text(text)
        .build();

        if let Err(e) = vector.add(record).await {
            warn!(%pattern_id, error = %e, "failed to index learned pattern");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::PredictorConfig;

    fn aggregator() -> LearningAggregator {
        LearningAggregator::new(Arc::new(PatternRegistry::new()), Arc::new(Predictor::new(PredictorConfig::default())), Arc::new(DomainHintMap::new()))
    }

    #[tokio::test]
    async fn success_with_no_pattern_learns_one_at_lightweight_tier() {
        let agg = aggregator();
        agg.handle(
            LearningEvent::Success {
                domain: "blog.example.com".into(),
                url: "https://blog.example.com/posts/hello".into(),
                tier: Tier::Lightweight,
                pattern_id: None,
                latency_ms: 120.0,
                content_hash: Some("h1".into()),
            },
            Utc::now(),
        )
        .await;

        let url = Url::parse("https://blog.example.com/posts/hello").unwrap();
        assert_eq!(agg.registry.match_for_url(&url).len(), 1);
    }

    #[tokio::test]
    async fn success_at_intelligence_tier_with_no_pattern_does_not_learn() {
        let agg = aggregator();
        agg.handle(
            LearningEvent::Success {
                domain: "api.example.com".into(),
                url: "https://api.example.com/v1/items".into(),
                tier: Tier::Intelligence,
                pattern_id: None,
                latency_ms: 80.0,
                content_hash: Some("h1".into()),
            },
            Utc::now(),
        )
        .await;

        assert!(agg.registry.is_empty());
    }

    #[tokio::test]
    async fn matching_pattern_success_applies_metric_update() {
        let registry = Arc::new(PatternRegistry::new());
        registry.bootstrap();
        let pattern_id = registry.snapshot()[0].id.clone();
        let host = registry.snapshot()[0].host.clone();
        let before = registry.get(&pattern_id).unwrap().success_count;

        let agg = LearningAggregator::new(registry.clone(), Arc::new(Predictor::new(PredictorConfig::default())), Arc::new(DomainHintMap::new()));
        agg.handle(
            LearningEvent::Success {
                domain: host,
                url: "https://github.com/rust-lang/rust".into(),
                tier: Tier::Intelligence,
                pattern_id: Some(pattern_id.clone()),
                latency_ms: 50.0,
                content_hash: None,
            },
            Utc::now(),
        )
        .await;

        assert_eq!(registry.get(&pattern_id).unwrap().success_count, before + 1);
    }

    #[tokio::test]
    async fn repeated_hash_reports_unchanged_content() {
        let agg = aggregator();
        let now = Utc::now();
        for i in 0..2 {
            agg.handle(
                LearningEvent::Success {
                    domain: "example.com".into(),
                    url: "https://example.com/feed".into(),
                    tier: Tier::Intelligence,
                    pattern_id: None,
                    latency_ms: 10.0,
                    content_hash: Some("same-hash".into()),
                },
                now + chrono::Duration::seconds(i),
            )
            .await;
        }

        let pattern = agg.predictor.get("example.com", "https://example.com/feed").unwrap();
        assert!(!pattern.observations.back().unwrap().changed);
    }

    #[tokio::test]
    async fn differing_hash_reports_changed_content() {
        let agg = aggregator();
        let now = Utc::now();
        agg.handle(
            LearningEvent::Success {
                domain: "example.com".into(),
                url: "https://example.com/feed".into(),
                tier: Tier::Intelligence,
                pattern_id: None,
                latency_ms: 10.0,
                content_hash: Some("hash-a".into()),
            },
            now,
        )
        .await;
        agg.handle(
            LearningEvent::Success {
                domain: "example.com".into(),
                url: "https://example.com/feed".into(),
                tier: Tier::Intelligence,
                pattern_id: None,
                latency_ms: 10.0,
                content_hash: Some("hash-b".into()),
            },
            now + chrono::Duration::seconds(1),
        )
        .await;

        let pattern = agg.predictor.get("example.com", "https://example.com/feed").unwrap();
        assert!(pattern.observations.back().unwrap().changed);
    }

    #[tokio::test]
    async fn probe_success_registers_fuzzing_sourced_pattern() {
        let agg = aggregator();
        agg.handle(
            LearningEvent::ProbeSucceeded {
                domain: "api.example.com".into(),
                url: "https://api.example.com/v1/health".into(),
                method: "HEAD".into(),
                requires_auth: false,
            },
            Utc::now(),
        )
        .await;

        let pattern = agg.registry.snapshot().into_iter().next().unwrap();
        assert_eq!(pattern.source, fathom_patterns::PatternSource::Fuzzing);
        assert_eq!(pattern.confidence, 0.8);
    }

    #[tokio::test]
    async fn failure_applies_pattern_metric_without_predictor_update() {
        let registry = Arc::new(PatternRegistry::new());
        registry.bootstrap();
        let pattern_id = registry.snapshot()[0].id.clone();
        let before = registry.get(&pattern_id).unwrap().failure_count;

        let agg = LearningAggregator::new(registry.clone(), Arc::new(Predictor::new(PredictorConfig::default())), Arc::new(DomainHintMap::new()));
        agg.handle(
            LearningEvent::Failure {
                domain: "github.com".into(),
                url: "https://github.com/rust-lang/rust".into(),
                tier: Tier::Intelligence,
                pattern_id: Some(pattern_id.clone()),
                reason: fathom_types::FailureReason::Timeout,
            },
            Utc::now(),
        )
        .await;

        assert_eq!(registry.get(&pattern_id).unwrap().failure_count, before + 1);
        assert!(agg.predictor.is_empty());
    }
}
