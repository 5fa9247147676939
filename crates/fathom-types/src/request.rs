//! `BrowseRequest` and its budget/freshness nested types (spec.md §3.1).

use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How fresh the returned content must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Freshness {
    /// Must reflect the live page right now; no cache-only path.
    Realtime,
    /// A cached response is acceptable if still valid.
    #[default]
    Cached,
    /// Any response, however stale, is acceptable.
    Any,
}

/// Budget/quality constraints for a single `browse` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Wall-clock ceiling for the whole request, across all tier attempts.
    pub max_latency_ms: Option<u64>,
    /// Highest tier (by cost) the cascade may attempt.
    pub max_cost_tier: Option<Tier>,
    pub freshness: Freshness,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_latency_ms: None,
            max_cost_tier: None,
            freshness: Freshness::default(),
        }
    }
}

/// Verification strictness layered on top of basic field-presence validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerifyMode {
    #[default]
    Basic,
    Standard,
    Thorough,
}

/// Caller-supplied verification hints (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Verify {
    pub mode: VerifyMode,
    /// Regexes that must all match somewhere in the extracted text.
    pub must_match: Vec<String>,
    /// Substrings that must all be present (the "contains-all" check).
    pub must_contain: Vec<String>,
}

/// A single fetch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseRequest {
    pub url: String,
    pub content_type_hint: Option<String>,
    /// e.g. `wait_for_selector`, `scroll_to_load` hints for the Playwright tier.
    pub wait_hints: Vec<String>,
    pub session_profile: Option<String>,
    pub budget: Budget,
    pub verify: Option<Verify>,
}

impl BrowseRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type_hint: None,
            wait_hints: Vec::new(),
            session_profile: None,
            budget: Budget::default(),
            verify: None,
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_session_profile(mut self, profile: impl Into<String>) -> Self {
        self.session_profile = Some(profile.into());
        self
    }

    /// The highest tier this request permits, defaulting to `Playwright`
    /// (all tiers) when the caller didn't specify one.
    pub fn max_cost_tier(&self) -> Tier {
        self.budget.max_cost_tier.unwrap_or(Tier::Playwright)
    }
}

/// Common options for a `batch_browse` call (spec.md §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub stop_on_error: bool,
    pub per_url_timeout_ms: Option<u64>,
    pub total_timeout_ms: Option<u64>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            stop_on_error: false,
            per_url_timeout_ms: None,
            total_timeout_ms: None,
        }
    }
}

/// Arbitrary per-URL overrides merged with a shared common request template.
pub type BatchOverrides = HashMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_cost_tier_is_playwright() {
        let req = BrowseRequest::new("https://example.com");
        assert_eq!(req.max_cost_tier(), Tier::Playwright);
    }

    #[test]
    fn explicit_max_cost_tier_is_respected() {
        let req = BrowseRequest::new("https://example.com").with_budget(Budget {
            max_latency_ms: Some(1000),
            max_cost_tier: Some(Tier::Lightweight),
            freshness: Freshness::Realtime,
        });
        assert_eq!(req.max_cost_tier(), Tier::Lightweight);
    }
}
