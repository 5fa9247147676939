//! `LearnedApiPattern`: the unit the registry matches, applies and archives
//! (spec.md §3.2, §4.2).

use crate::extractor::VariableExtractor;
use crate::mapping::ContentMapping;
use crate::template::PatternTemplate;
use chrono::{DateTime, Utc};
use fathom_types::FailureReason;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternSource {
    Bootstrap,
    Fuzzing,
    Learned,
}

/// Sentinel endpoint template meaning "append-style": the endpoint is the
/// source URL itself, untouched.
pub const APPEND_STYLE_SENTINEL: &str = "{url}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedApiPattern {
    pub id: String,
    pub host: String,
    pub template: PatternTemplate,
    /// Regex matched against the full URL string.
    pub url_pattern: String,
    /// `{name}` placeholders substituted from `extractors`, or the literal
    /// sentinel [`APPEND_STYLE_SENTINEL`].
    pub endpoint_template: String,
    pub extractors: Vec<VariableExtractor>,
    pub required_fields: Vec<String>,
    /// JSON-path expressions producing `{title, description?, body?,
    /// metadata?}` from the raw response (spec.md §4.7).
    pub content_mapping: ContentMapping,
    pub min_content_length: usize,
    pub success_count: u64,
    pub failure_count: u64,
    pub avg_response_time_ms: f64,
    pub confidence: f64,
    pub coverage: HashSet<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure_reason: Option<FailureReason>,
    pub source: PatternSource,
    pub created_at: DateTime<Utc>,
}

impl LearnedApiPattern {
    pub fn matches_url(&self, url: &Url) -> bool {
        Regex::new(&self.url_pattern)
            .map(|re| re.is_match(url.as_str()))
            .unwrap_or(false)
    }

    /// Run every extractor against `url` and substitute into
    /// `endpoint_template`. Requires every extractor to succeed, per spec.md
    /// §4.2 step 3.
    pub fn build_endpoint(&self, url: &Url) -> Option<String> {
        if self.endpoint_template == APPEND_STYLE_SENTINEL {
            return Some(url.as_str().to_string());
        }

        let mut endpoint = self.endpoint_template.clone();
        for extractor in &self.extractors {
            let value = extractor.apply(url)?;
            endpoint = endpoint.replace(&format!("{{{}}}", extractor.name), &value);
        }
        Some(endpoint)
    }

    /// Update metrics on success and recompute confidence. Returns the
    /// confidence delta for the caller to decide whether to emit
    /// `PatternEvent::ConfidenceChanged` (spec.md §4.2 "|Δ| > 0.01").
    pub fn apply_success(&mut self, latency_ms: f64, domain: &str) -> f64 {
        let previous = self.confidence;
        self.success_count += 1;
        self.avg_response_time_ms +=
            (latency_ms - self.avg_response_time_ms) / self.success_count as f64;
        self.coverage.insert(domain.to_string());
        self.last_success = Some(Utc::now());
        self.recompute_confidence();
        self.confidence - previous
    }

    pub fn apply_failure(&mut self, reason: FailureReason) -> f64 {
        let previous = self.confidence;
        self.failure_count += 1;
        self.last_failure_reason = Some(reason);
        self.recompute_confidence();
        self.confidence - previous
    }

    fn recompute_confidence(&mut self) {
        let total = self.success_count + self.failure_count;
        self.confidence = if total == 0 {
            0.0
        } else {
            self.success_count as f64 / total as f64
        };
    }

    /// `cleanup()`'s per-pattern predicate (spec.md §4.2 "Archival").
    pub fn is_archivable(&self, now: DateTime<Utc>, archive_after_days: i64, min_confidence: f64) -> bool {
        let idle = match self.last_success {
            Some(last) => (now - last).num_days() > archive_after_days,
            None => (now - self.created_at).num_days() > archive_after_days,
        };
        idle || self.confidence < min_confidence
    }
}
