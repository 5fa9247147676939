//! C8: the Tiered Fetcher. Runs the render-tier cascade (spec.md §4.1),
//! applies the validation gate from [`crate::validation`] and in-tier retry
//! from [`crate::backoff`], and emits `LearningEvent`s for C9 to consume.
//!
//! Grounded on `riptide_reliability::circuit_breaker` for the per-(domain,
//! tier) breaker and `riptide_reliability::engine_selection` for the
//! content-sniffing escalation signal, both generalized to this cascade's
//! three tiers.

use crate::backoff::next_delay;
use crate::cascade::select_candidates;
use crate::state::{FetchState, FetchTrace};
use crate::validation::run_validation_gate;
use dashmap::DashMap;
use fathom_adapters::RenderAdapterState;
use fathom_patterns::{LearnedApiPattern, PatternRegistry};
use fathom_types::{
    BrowseRequest, BrowseResult, DomainHintMap, FailureReason, FathomError, FetcherConfig,
    LearningEvent, RenderAdapter, Result, Tier,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

const BREAKER_TRIP_THRESHOLD: u32 = 3;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(60);

/// Orchestrates adapters registered per tier into the cascade described in
/// spec.md §4.1. Holds no state about any single in-flight request; all
/// per-request bookkeeping lives in the `browse` call's locals.
pub struct TieredFetcher {
    adapters: HashMap<Tier, Arc<dyn RenderAdapter>>,
    registry: Arc<PatternRegistry>,
    hints: Arc<DomainHintMap>,
    breakers: DashMap<(String, Tier), RenderAdapterState>,
    playwright_gate: Arc<Semaphore>,
    learning_tx: Option<mpsc::UnboundedSender<LearningEvent>>,
    config: FetcherConfig,
}

impl TieredFetcher {
    /// `hints` is shared with, and written only by, the learning consumer
    /// (spec.md §4 component table: "Learning Engine ... updates C4/C5/C2
    /// and the adapter hints") — this crate only ever reads it.
    pub fn new(
        adapters: HashMap<Tier, Arc<dyn RenderAdapter>>,
        registry: Arc<PatternRegistry>,
        hints: Arc<DomainHintMap>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            playwright_gate: Arc::new(Semaphore::new(config.max_concurrent_playwright)),
            adapters,
            registry,
            hints,
            breakers: DashMap::new(),
            learning_tx: None,
            config,
        }
    }

    pub fn with_learning_sender(mut self, tx: mpsc::UnboundedSender<LearningEvent>) -> Self {
        self.learning_tx = Some(tx);
        self
    }

    /// Run the cascade for one request. Cancellable from any state via
    /// `cancel`; a cancellation mid-attempt is reported as
    /// [`FathomError::Cancelled`], never retried.
    pub async fn browse(&self, request: &BrowseRequest, cancel: CancellationToken) -> Result<BrowseResult> {
        let started = Instant::now();
        let url = Url::parse(&request.url)?;
        let domain = url.host_str().unwrap_or("").to_string();

        let max_latency_ms = request.budget.max_latency_ms.unwrap_or(self.config.default_max_latency_ms);
        let deadline = started + Duration::from_millis(max_latency_ms);

        let mut trace = FetchTrace::new();
        trace.push(FetchState::Selecting);

        let preferred = self.hints.preferred_tier(&domain);
        let candidates = select_candidates(request.max_cost_tier(), request.budget.freshness, preferred);
        let pattern = self.registry.match_for_url(&url).into_iter().next();

        let mut tiers_attempted = Vec::new();
        let mut last_error: Option<FailureReason> = None;

        for tier in candidates {
            if cancel.is_cancelled() {
                trace.push(FetchState::Cancelled);
                return Err(FathomError::Cancelled);
            }

            let Some(adapter) = self.adapters.get(&tier) else { continue };

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline.saturating_duration_since(now);
            if remaining.as_millis() < tier.typical_latency_ms() as u128 {
                continue;
            }

            if !self.breaker_available(&domain, tier) {
                debug!(%domain, %tier, "tier breaker open, skipping");
                continue;
            }

            let mut attempt: u32 = 1;
            'retry: loop {
                trace.push(FetchState::Attempting(tier));
                tiers_attempted.push(tier);

                let _permit = if tier == Tier::Playwright {
                    Some(
                        self.playwright_gate
                            .clone()
                            .acquire_owned()
                            .await
                            .map_err(|e| FathomError::Internal(format!("playwright semaphore closed: {e}")))?,
                    )
                } else {
                    None
                };

                match adapter.fetch(request).await {
                    Ok(mut result) => {
                        trace.push(FetchState::Validating(tier));
                        result.metadata.tiers_attempted = tiers_attempted.clone();
                        result.metadata.tier_used = tier;

                        let gate = run_validation_gate(&result, pattern.as_ref(), request.verify.as_ref());
                        let gate_passed = gate.passed();
                        result.learning.validation = gate.validation;
                        result.verification = gate.verification;

                        if gate_passed {
                            trace.push(FetchState::Succeeded(tier));
                            let latency_ms = started.elapsed().as_millis() as f64;
                            self.record_success(request, &domain, tier, pattern.as_ref(), latency_ms, &result);
                            return Ok(result);
                        }

                        let reason = FailureReason::Validation;
                        trace.push(FetchState::Failed(tier, reason));
                        self.record_failure(request, &domain, tier, pattern.as_ref(), reason);
                        last_error = Some(reason);
                        break 'retry; // validation never retries in-tier; escalate
                    }
                    Err(err) => {
                        let reason = FailureReason::classify(None, &err.to_string());
                        trace.push(FetchState::Failed(tier, reason));
                        self.record_failure(request, &domain, tier, pattern.as_ref(), reason);
                        last_error = Some(reason);

                        if reason.is_terminal() {
                            return Err(FathomError::Terminal { reason });
                        }

                        if reason.is_retryable_in_tier() {
                            let remaining_budget_ms =
                                deadline.saturating_duration_since(Instant::now()).as_millis() as u64;
                            if let Some(delay) = next_delay(attempt, remaining_budget_ms) {
                                attempt += 1;
                                tokio::select! {
                                    _ = tokio::time::sleep(delay) => continue 'retry,
                                    _ = cancel.cancelled() => {
                                        trace.push(FetchState::Cancelled);
                                        return Err(FathomError::Cancelled);
                                    }
                                }
                            }
                        }
                        break 'retry;
                    }
                }
            }
        }

        trace.push(FetchState::Exhausted);
        match last_error {
            Some(reason) => Err(FathomError::AllTiersFailed { last_reason: reason }),
            None => Err(FathomError::BudgetExhausted),
        }
    }

    /// The domain's current hint, if any, for callers (the façade's domain
    /// intelligence report) that want to surface it without reaching into
    /// the hint map directly.
    pub fn preferred_tier(&self, domain: &str) -> Option<Tier> {
        self.hints.preferred_tier(domain)
    }

    fn breaker_available(&self, domain: &str, tier: Tier) -> bool {
        let mut entry = self
            .breakers
            .entry((domain.to_string(), tier))
            .or_insert_with(|| RenderAdapterState::new(tier, BREAKER_TRIP_THRESHOLD, BREAKER_COOLDOWN));
        entry.is_available(Instant::now())
    }

    fn record_success(
        &self,
        request: &BrowseRequest,
        domain: &str,
        tier: Tier,
        pattern: Option<&LearnedApiPattern>,
        latency_ms: f64,
        result: &BrowseResult,
    ) {
        // Circuit breakers are this crate's own bookkeeping, updated
        // in-line. The registry/predictor/vector store/hint map are mutated
        // only by the learning consumer reading the emitted event below
        // (spec.md §4.1 "Cyclic references avoided").
        self.breakers
            .entry((domain.to_string(), tier))
            .or_insert_with(|| RenderAdapterState::new(tier, BREAKER_TRIP_THRESHOLD, BREAKER_COOLDOWN))
            .record_success();
        self.emit(LearningEvent::Success {
            domain: domain.to_string(),
            url: request.url.clone(),
            tier,
            pattern_id: pattern.map(|p| p.id.clone()),
            latency_ms,
            content_hash: fingerprint_content(result),
        });
    }

    fn record_failure(
        &self,
        request: &BrowseRequest,
        domain: &str,
        tier: Tier,
        pattern: Option<&LearnedApiPattern>,
        reason: FailureReason,
    ) {
        self.breakers
            .entry((domain.to_string(), tier))
            .or_insert_with(|| RenderAdapterState::new(tier, BREAKER_TRIP_THRESHOLD, BREAKER_COOLDOWN))
            .record_failure(Instant::now());
        self.emit(LearningEvent::Failure {
            domain: domain.to_string(),
            url: request.url.clone(),
            tier,
            pattern_id: pattern.map(|p| p.id.clone()),
            reason,
        });
    }

    fn emit(&self, event: LearningEvent) {
        if let Some(tx) = &self.learning_tx {
            let _ = tx.send(event);
        }
    }
}

/// Stable fingerprint of a successful result's text content, for the
/// learning consumer to diff against the previous fingerprint it recorded
/// for this URL.
fn fingerprint_content(result: &BrowseResult) -> Option<String> {
    let text = if !result.content.text.is_empty() { &result.content.text } else { &result.content.markdown };
    if text.is_empty() {
        return None;
    }
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    Some(format!("{:016x}", hasher.finish()))
}
