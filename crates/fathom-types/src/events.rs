//! Cross-crate learning events emitted by `fathom-fetcher` and consumed by
//! `fathom-learning` (spec.md §4.1 "learning side effects", §5).
//!
//! Kept in this crate rather than in either producer or consumer so neither
//! depends on the other: `fathom-fetcher` only needs to construct these,
//! `fathom-learning` only needs to match on them.

use crate::error::FailureReason;
use crate::tier::Tier;
use serde::{Deserialize, Serialize};

/// One tier attempt's outcome, destined for the pattern registry, predictor
/// and vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LearningEvent {
    Success {
        domain: String,
        url: String,
        tier: Tier,
        pattern_id: Option<String>,
        latency_ms: f64,
        /// Fingerprint of the returned content, for the consumer to diff
        /// against the previous fingerprint it saw for this URL and decide
        /// whether content changed. `None` when the tier produced no stable
        /// content to fingerprint.
        content_hash: Option<String>,
    },
    Failure {
        domain: String,
        url: String,
        tier: Tier,
        pattern_id: Option<String>,
        reason: FailureReason,
    },
    /// A Discovery Orchestrator (C10) probe succeeded against a path the
    /// registry has no pattern for yet (spec.md §4.6). Carries enough to
    /// build a `LearnedApiPattern` with `source=fuzzing`, confidence 0.8.
    ProbeSucceeded {
        domain: String,
        /// The full probed URL.
        url: String,
        method: String,
        requires_auth: bool,
    },
}

impl LearningEvent {
    pub fn domain(&self) -> &str {
        match self {
            LearningEvent::Success { domain, .. } => domain,
            LearningEvent::Failure { domain, .. } => domain,
            LearningEvent::ProbeSucceeded { domain, .. } => domain,
        }
    }

    pub fn pattern_id(&self) -> Option<&str> {
        match self {
            LearningEvent::Success { pattern_id, .. } => pattern_id.as_deref(),
            LearningEvent::Failure { pattern_id, .. } => pattern_id.as_deref(),
            LearningEvent::ProbeSucceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_accessor_covers_both_variants() {
        let success = LearningEvent::Success {
            domain: "example.com".into(),
            url: "https://example.com".into(),
            tier: Tier::Lightweight,
            pattern_id: None,
            latency_ms: 120.0,
            content_hash: Some("abc123".into()),
        };
        assert_eq!(success.domain(), "example.com");

        let failure = LearningEvent::Failure {
            domain: "example.com".into(),
            url: "https://example.com".into(),
            tier: Tier::Intelligence,
            pattern_id: Some("p1".into()),
            reason: FailureReason::Timeout,
        };
        assert_eq!(failure.pattern_id(), Some("p1"));
    }
}
