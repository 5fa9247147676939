//! Return shapes for the programmatic contract (spec.md §6.1) that don't
//! belong to any single lower crate — they're views across C4/C5/C2/C8
//! assembled here, not state any one component owns.

use fathom_types::{BrowseResult, FailureReason};
use serde::{Deserialize, Serialize};

/// `getDomainIntelligence(domain)` (spec.md §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainIntelligence {
    pub domain: String,
    pub known_patterns: usize,
    pub success_rate: f64,
    pub recommended_wait_strategy: String,
    pub recent_failures: Vec<FailureReason>,
    /// Never populated: spec.md names this field but the system has no
    /// concept of grouping related domains anywhere else, so there is
    /// nothing to derive it from. Reserved for a future domain-clustering
    /// feature.
    pub domain_group: Option<String>,
}

/// `getLearningStats()` (spec.md §6.1): registry + predictor + vector counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LearningStats {
    pub registry_count: usize,
    pub predictor_count: usize,
    pub vector_count: usize,
}

/// One URL's outcome within a `batchBrowse` call. The error is flattened to
/// its display string so the whole report can round-trip through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemOutcome {
    pub url: String,
    pub result: Result<BrowseResult, String>,
}

/// `batchBrowse(...)` (spec.md §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchBrowseReport {
    pub results: Vec<BatchItemOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_time_ms: u64,
}
