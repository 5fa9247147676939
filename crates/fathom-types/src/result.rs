//! `BrowseResult` and its nested metadata/learning types (spec.md §3.1).

use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extracted content in the shapes C1 (`fathom-extraction`) produces.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedContent {
    pub markdown: String,
    pub text: String,
    pub html: Option<String>,
}

/// A table extracted from the page, row-major, header optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedTable {
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A URL→API pattern discovered or confirmed while serving this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredApi {
    pub endpoint: String,
    pub pattern_id: Option<String>,
    pub can_bypass_browser: bool,
}

/// Metadata describing how the result was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseMetadata {
    pub load_time_ms: u64,
    pub tier_used: Tier,
    pub tiers_attempted: Vec<Tier>,
    pub cached: bool,
}

/// Outcome of the validation gate plus learning side-effects (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub missing_fields: Vec<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningInfo {
    pub confidence: f64,
    pub validation: ValidationOutcome,
    pub content_changed: Option<bool>,
    pub selectors_applied: Vec<String>,
}

/// Caller-supplied `Verify` result, populated only when the request asked
/// for `verify.mode` beyond `basic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub mode_applied: String,
    pub checks_passed: usize,
    pub checks_failed: Vec<String>,
}

/// The full result of a `browse` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseResult {
    pub url: String,
    pub final_url: String,
    pub title: Option<String>,
    pub content: ExtractedContent,
    pub tables: Vec<ExtractedTable>,
    pub discovered_apis: Vec<DiscoveredApi>,
    pub metadata: BrowseMetadata,
    pub learning: LearningInfo,
    pub verification: Option<VerificationReport>,
    #[serde(default)]
    pub structured: HashMap<String, serde_json::Value>,
}

impl BrowseResult {
    /// Invariant from spec.md §3.1/§8: `tiers_attempted[0]` is the cheapest
    /// tier consistent with the request's budget, and `tier_used` equals the
    /// last attempted tier.
    pub fn check_tier_invariant(&self) -> bool {
        match self.metadata.tiers_attempted.last() {
            Some(last) => *last == self.metadata.tier_used,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tiers: Vec<Tier>) -> BrowseResult {
        BrowseResult {
            url: "https://example.com".into(),
            final_url: "https://example.com".into(),
            title: None,
            content: ExtractedContent::default(),
            tables: vec![],
            discovered_apis: vec![],
            metadata: BrowseMetadata {
                load_time_ms: 10,
                tier_used: *tiers.last().unwrap(),
                tiers_attempted: tiers,
                cached: false,
            },
            learning: LearningInfo {
                confidence: 1.0,
                validation: ValidationOutcome {
                    passed: true,
                    missing_fields: vec![],
                    reason: None,
                },
                content_changed: None,
                selectors_applied: vec![],
            },
            verification: None,
            structured: HashMap::new(),
        }
    }

    #[test]
    fn tier_used_matches_last_attempted() {
        let result = sample(vec![Tier::Intelligence, Tier::Lightweight]);
        assert!(result.check_tier_invariant());
    }

    #[test]
    fn empty_attempts_violate_invariant() {
        let mut result = sample(vec![Tier::Intelligence]);
        result.metadata.tiers_attempted.clear();
        assert!(!result.check_tier_invariant());
    }
}
