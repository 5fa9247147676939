//! Per-domain tier preference cache (spec.md §3.2 `RenderAdapterState`:
//! "cached domain preferences", and §4 component table: "Learning Engine
//! ... updates C4/C5/C2 and the adapter hints").
//!
//! Lives in this crate, not `fathom-fetcher`, because the Learning Engine
//! (C9) is the sole writer while the Tiered Fetcher (C8) only reads it —
//! putting the type where both already depend avoids a C8→C9 edge.
//!
//! Grounded on `riptide_reliability::engine_selection::EngineCacheable`'s
//! warm-start idea — a domain that has recently succeeded on a cheap tier
//! gets that tier tried first next time — generalized from a single cached
//! engine to a success-weighted EMA confidence per tier so a few stray
//! failures don't immediately discard a good hint.

use crate::tier::Tier;
use dashmap::DashMap;
use std::time::{Duration, Instant};

const EMA_ALPHA: f64 = 0.3;
const MIN_CONFIDENCE_TO_PREFER: f64 = 0.7;
const HINT_TTL: Duration = Duration::from_secs(10 * 60);

struct DomainHint {
    tier: Tier,
    confidence: f64,
    updated_at: Instant,
}

/// Success-weighted, TTL-bounded map of `domain -> preferred tier`. Written
/// only by [`DomainHintMap::record_success`]/[`DomainHintMap::record_failure`]
/// (the Learning Engine); read only by [`DomainHintMap::preferred_tier`]
/// (the Tiered Fetcher).
pub struct DomainHintMap {
    hints: DashMap<String, DomainHint>,
}

impl Default for DomainHintMap {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainHintMap {
    pub fn new() -> Self {
        Self { hints: DashMap::new() }
    }

    pub fn record_success(&self, domain: &str, tier: Tier) {
        self.update(domain, tier, 1.0);
    }

    pub fn record_failure(&self, domain: &str, tier: Tier) {
        self.update(domain, tier, 0.0);
    }

    fn update(&self, domain: &str, tier: Tier, sample: f64) {
        let mut entry = self.hints.entry(domain.to_string()).or_insert_with(|| DomainHint {
            tier,
            confidence: sample,
            updated_at: Instant::now(),
        });
        if entry.tier != tier {
            // a different tier just won; let it take over starting from this sample
            entry.tier = tier;
            entry.confidence = sample;
        } else {
            entry.confidence = EMA_ALPHA * sample + (1.0 - EMA_ALPHA) * entry.confidence;
        }
        entry.updated_at = Instant::now();
    }

    /// The domain's preferred tier, if confident and not stale.
    pub fn preferred_tier(&self, domain: &str) -> Option<Tier> {
        let entry = self.hints.get(domain)?;
        if entry.updated_at.elapsed() > HINT_TTL {
            return None;
        }
        if entry.confidence >= MIN_CONFIDENCE_TO_PREFER {
            Some(entry.tier)
        } else {
            None
        }
    }
}
