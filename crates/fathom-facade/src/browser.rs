//! `SmartBrowser`: the façade component (C11) wiring the tiered fetcher
//! (C8), learning engine (C9) and discovery orchestrator (C10) behind the
//! single programmatic contract spec.md §6.1 describes.
//!
//! Grounded on `riptide_facade::facades::crawl_facade::CrawlFacade`: a thin
//! struct holding `Arc`s to the components it delegates to, with each public
//! method a short wrapper rather than fresh logic.

use crate::dto::{BatchBrowseReport, BatchItemOutcome, DomainIntelligence, LearningStats};
use crate::overrides;
use fathom_discovery::{DiscoveryOrchestrator, LiveRequestGate};
use fathom_fetcher::TieredFetcher;
use fathom_patterns::PatternRegistry;
use fathom_predictor::Predictor;
use fathom_types::{
    BatchOptions, BatchOverrides, BrowseRequest, BrowseResult, FathomError, Result, Tier,
    VectorStore,
};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns every component C11 orchestrates. Cheap to clone (everything behind
/// an `Arc`); construct once per process via [`crate::SmartBrowserBuilder`].
pub struct SmartBrowser {
    pub(crate) fetcher: Arc<TieredFetcher>,
    pub(crate) registry: Arc<PatternRegistry>,
    pub(crate) predictor: Arc<Predictor>,
    pub(crate) vector: Option<Arc<dyn VectorStore>>,
    pub(crate) discovery: Option<Arc<DiscoveryOrchestrator>>,
    pub(crate) live_gate: LiveRequestGate,
    // Kept alive for the process lifetime; dropping it would stop the
    // learning consumer task.
    pub(crate) _learning_task: Arc<JoinHandle<()>>,
}

impl SmartBrowser {
    /// `browse(BrowseRequest) -> BrowseResult` (spec.md §6.1). Counts as a
    /// live request for the duration of the call, so a concurrently running
    /// discovery sweep yields to it (spec.md §5 backpressure).
    pub async fn browse(&self, request: BrowseRequest) -> Result<BrowseResult> {
        self.browse_cancellable(request, CancellationToken::new()).await
    }

    /// Like [`SmartBrowser::browse`] but with a caller-supplied cancellation
    /// token, for hosts that want to cancel an in-flight request from
    /// outside (spec.md §5 "each task carries a cancellation token").
    pub async fn browse_cancellable(&self, request: BrowseRequest, cancel: CancellationToken) -> Result<BrowseResult> {
        let _guard = self.live_gate.guard();
        self.fetcher.browse(&request, cancel).await
    }

    /// `batchBrowse(urls[], common, options) -> {results[], successCount,
    /// failureCount, totalTime}` (spec.md §6.1). Runs up to
    /// `options.concurrency` URLs at once; `stop_on_error` stops launching
    /// new URLs once one has failed (in-flight URLs still complete).
    pub async fn batch_browse(
        &self,
        urls: Vec<String>,
        common: BrowseRequest,
        overrides: BatchOverrides,
        options: BatchOptions,
    ) -> BatchBrowseReport {
        let started = Instant::now();
        let stopped = Arc::new(AtomicBool::new(false));

        let items = urls.into_iter().map(|url| {
            let common = common.clone();
            let raw_override = overrides.get(&url).cloned();
            let stopped = stopped.clone();
            async move {
                if stopped.load(Ordering::Acquire) {
                    return None;
                }

                let request = overrides::apply(&common, &url, raw_override.as_ref());
                let attempt = self.browse(request);
                let outcome = match options.per_url_timeout_ms {
                    Some(ms) => tokio::time::timeout(Duration::from_millis(ms), attempt)
                        .await
                        .unwrap_or_else(|_| Err(FathomError::Internal("per-url timeout exceeded".into()))),
                    None => attempt.await,
                };

                if options.stop_on_error && outcome.is_err() {
                    stopped.store(true, Ordering::Release);
                }

                Some(BatchItemOutcome { url, result: outcome.map_err(|e| e.to_string()) })
            }
        });

        let concurrency = options.concurrency.max(1);
        let collect = stream::iter(items)
            .buffer_unordered(concurrency)
            .filter_map(|item| async move { item })
            .collect::<Vec<_>>();

        let results = match options.total_timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), collect).await.unwrap_or_default(),
            None => collect.await,
        };

        let success_count = results.iter().filter(|r| r.result.is_ok()).count();
        let failure_count = results.len() - success_count;

        BatchBrowseReport {
            results,
            success_count,
            failure_count,
            total_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// `getDomainIntelligence(domain) -> {knownPatterns, successRate,
    /// recommendedWaitStrategy, recentFailures, domainGroup?}` (spec.md
    /// §6.1).
    pub fn get_domain_intelligence(&self, domain: &str) -> DomainIntelligence {
        let patterns = self.registry.patterns_for_host(domain);
        let (successes, failures) = patterns
            .iter()
            .fold((0u64, 0u64), |(s, f), p| (s + p.success_count, f + p.failure_count));
        let total = successes + failures;
        let success_rate = if total == 0 { 0.0 } else { successes as f64 / total as f64 };
        let recent_failures = patterns.iter().filter_map(|p| p.last_failure_reason).take(5).collect();

        DomainIntelligence {
            domain: domain.to_string(),
            known_patterns: patterns.len(),
            success_rate,
            recommended_wait_strategy: wait_strategy_for(self.fetcher.preferred_tier(domain)),
            recent_failures,
            domain_group: None,
        }
    }

    /// `getLearningStats() -> registry + predictor + vector counts`
    /// (spec.md §6.1).
    pub async fn get_learning_stats(&self) -> Result<LearningStats> {
        let vector_count = match &self.vector {
            Some(store) => store.stats().await?.count,
            None => 0,
        };
        Ok(LearningStats {
            registry_count: self.registry.len(),
            predictor_count: self.predictor.len(),
            vector_count,
        })
    }

    /// Run one discovery sweep for `domain` if a discovery orchestrator is
    /// configured; a no-op returning `None` otherwise. Exposed for hosts
    /// that want to trigger discovery on-demand rather than on a timer.
    pub async fn discover(&self, domain: &str) -> Option<fathom_discovery::SweepSummary> {
        match &self.discovery {
            Some(orchestrator) => Some(orchestrator.probe_domain(domain).await),
            None => None,
        }
    }
}

/// recommendedWaitStrategy heuristic: derived from the fetcher's current
/// tier hint for the domain (spec.md leaves the exact derivation open).
/// Intelligence needs no page wait at all; an unconfident/unseen domain
/// defaults to the cheapest tier that still renders a DOM.
fn wait_strategy_for(tier: Option<Tier>) -> String {
    match tier {
        Some(Tier::Intelligence) => "none",
        Some(Tier::Lightweight) => "dom-content-loaded",
        Some(Tier::Playwright) => "network-idle",
        None => "dom-content-loaded",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_strategy_maps_each_tier() {
        assert_eq!(wait_strategy_for(Some(Tier::Intelligence)), "none");
        assert_eq!(wait_strategy_for(Some(Tier::Lightweight)), "dom-content-loaded");
        assert_eq!(wait_strategy_for(Some(Tier::Playwright)), "network-idle");
        assert_eq!(wait_strategy_for(None), "dom-content-loaded");
    }
}
