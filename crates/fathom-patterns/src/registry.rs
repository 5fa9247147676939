//! `PatternRegistry`: the host-indexed, single-writer-discipline map of
//! learned patterns (spec.md §4.2, §5).
//!
//! Grounded on `riptide_intelligence::registry::LlmRegistry`'s `DashMap`
//! fields: per-key independence, no global lock, readers see a consistent
//! snapshot of one entry at a time.

use crate::bootstrap::seed_patterns;
use crate::events::{ArchiveReason, PatternEvent};
use crate::learn;
use crate::pattern::LearnedApiPattern;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fathom_types::FailureReason;
use url::Url;

pub enum ApplyOutcome {
    Success { latency_ms: f64, domain: String },
    Failure { reason: FailureReason },
}

/// Host-indexed registry of learned API patterns. All mutation happens
/// through [`PatternRegistry::apply_pattern`], [`PatternRegistry::learn`] and
/// [`PatternRegistry::cleanup`] — each an atomic section between suspension
/// points, per spec.md §5's single-writer-discipline.
pub struct PatternRegistry {
    patterns: DashMap<String, LearnedApiPattern>,
    host_index: DashMap<String, Vec<String>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self {
            patterns: DashMap::new(),
            host_index: DashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Seed built-in patterns if the registry is empty (spec.md §4.2
    /// "Bootstrap"). No-op, returning no events, if patterns already exist.
    pub fn bootstrap(&self) -> Vec<PatternEvent> {
        if !self.is_empty() {
            return Vec::new();
        }
        seed_patterns()
            .into_iter()
            .map(|pattern| {
                let id = pattern.id.clone();
                let host = pattern.host.clone();
                self.insert(pattern);
                PatternEvent::Learned { pattern_id: id, host }
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<LearnedApiPattern> {
        self.patterns.get(id).map(|entry| entry.value().clone())
    }

    fn insert(&self, pattern: LearnedApiPattern) {
        let id = pattern.id.clone();
        let host = pattern.host.clone();
        self.patterns.insert(id.clone(), pattern);
        self.host_index.entry(host).or_default().push(id);
    }

    /// The match algorithm from spec.md §4.2: host-indexed lookup first; only
    /// scan cross-domain when the host index is empty. Results are sorted by
    /// confidence desc.
    pub fn match_for_url(&self, url: &Url) -> Vec<LearnedApiPattern> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };

        let mut candidates: Vec<LearnedApiPattern> = match self.host_index.get(host) {
            Some(ids) if !ids.is_empty() => ids
                .iter()
                .filter_map(|id| self.patterns.get(id).map(|e| e.value().clone()))
                .filter(|p| p.matches_url(url))
                .collect(),
            _ => self
                .patterns
                .iter()
                .map(|e| e.value().clone())
                .filter(|p| p.matches_url(url))
                .collect(),
        };

        candidates.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        candidates
    }

    /// Infer and register a pattern for a host with no existing coverage
    /// (spec.md §4.2 "Learning a new pattern").
    pub fn learn(&self, source_url: &Url, endpoint: &str) -> Option<PatternEvent> {
        let pattern = learn::infer_pattern(source_url, endpoint)?;
        let id = pattern.id.clone();
        let host = pattern.host.clone();
        self.insert(pattern);
        Some(PatternEvent::Learned { pattern_id: id, host })
    }

    /// `applyPattern(success, latency?)` (spec.md §4.2 "Metric update").
    /// Returns the `Applied` event plus a `ConfidenceChanged` event when the
    /// delta exceeds the 0.01 materiality threshold.
    pub fn apply_pattern(&self, id: &str, outcome: ApplyOutcome) -> Vec<PatternEvent> {
        let Some(mut entry) = self.patterns.get_mut(id) else {
            return Vec::new();
        };

        let (applied, delta) = match outcome {
            ApplyOutcome::Success { latency_ms, domain } => {
                let delta = entry.apply_success(latency_ms, &domain);
                (
                    PatternEvent::Applied {
                        pattern_id: id.to_string(),
                        success: true,
                        latency_ms: Some(latency_ms),
                        failure_reason: None,
                    },
                    delta,
                )
            }
            ApplyOutcome::Failure { reason } => {
                let delta = entry.apply_failure(reason);
                (
                    PatternEvent::Applied {
                        pattern_id: id.to_string(),
                        success: false,
                        latency_ms: None,
                        failure_reason: Some(reason),
                    },
                    delta,
                )
            }
        };

        let new_confidence = entry.confidence;
        drop(entry);

        let mut events = vec![applied];
        if delta.abs() > 0.01 {
            events.push(PatternEvent::ConfidenceChanged {
                pattern_id: id.to_string(),
                old_confidence: new_confidence - delta,
                new_confidence,
            });
        }
        events
    }

    /// Register a pattern harvested by the Discovery Orchestrator (spec.md
    /// §4.6): same inference as [`PatternRegistry::learn`], but tagged
    /// `source=fuzzing` at the fixed moderate confidence probes start at
    /// rather than the single-observation confidence `learn` computes.
    pub fn learn_from_probe(&self, source_url: &Url, endpoint: &str, requires_auth: bool) -> Option<PatternEvent> {
        let mut pattern = crate::learn::infer_pattern(source_url, endpoint)?;
        pattern.source = crate::pattern::PatternSource::Fuzzing;
        pattern.confidence = 0.8;
        if requires_auth {
            pattern.required_fields.push("authorization".to_string());
        }
        let id = pattern.id.clone();
        let host = pattern.host.clone();
        self.insert(pattern);
        Some(PatternEvent::Learned { pattern_id: id, host })
    }

    /// `cleanup()` (spec.md §4.2 "Archival"). Removes archivable patterns
    /// from both maps and emits one `Archived` event per removal.
    pub fn cleanup(&self, now: DateTime<Utc>, archive_after_days: i64, min_confidence: f64) -> Vec<PatternEvent> {
        let to_archive: Vec<(String, String, ArchiveReason)> = self
            .patterns
            .iter()
            .filter_map(|entry| {
                let pattern = entry.value();
                if !pattern.is_archivable(now, archive_after_days, min_confidence) {
                    return None;
                }
                let reason = if pattern.confidence < min_confidence {
                    ArchiveReason::LowConfidence
                } else {
                    ArchiveReason::Idle
                };
                Some((pattern.id.clone(), pattern.host.clone(), reason))
            })
            .collect();

        for (id, host, _) in &to_archive {
            self.patterns.remove(id);
            if let Some(mut ids) = self.host_index.get_mut(host) {
                ids.retain(|existing| existing != id);
            }
        }

        to_archive
            .into_iter()
            .map(|(pattern_id, _, reason)| PatternEvent::Archived { pattern_id, reason })
            .collect()
    }

    /// Every pattern indexed under `host`, unfiltered by URL shape — used by
    /// the façade's domain intelligence report (spec.md §6.1), which wants
    /// "all patterns known for this domain" rather than a single-URL match.
    pub fn patterns_for_host(&self, host: &str) -> Vec<LearnedApiPattern> {
        match self.host_index.get(host) {
            Some(ids) => ids.iter().filter_map(|id| self.patterns.get(id).map(|e| e.value().clone())).collect(),
            None => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Vec<LearnedApiPattern> {
        self.patterns.iter().map(|e| e.value().clone()).collect()
    }

    pub fn restore(&self, patterns: Vec<LearnedApiPattern>) {
        self.patterns.clear();
        self.host_index.clear();
        for pattern in patterns {
            self.insert(pattern);
        }
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::seed_patterns;

    #[test]
    fn bootstrap_seeds_only_when_empty() {
        let registry = PatternRegistry::new();
        let events = registry.bootstrap();
        assert_eq!(events.len(), seed_patterns().len());

        let before = registry.len();
        let second_run = registry.bootstrap();
        assert!(second_run.is_empty());
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn match_for_url_prefers_host_index_and_sorts_by_confidence() {
        let registry = PatternRegistry::new();
        registry.bootstrap();
        let url = Url::parse("https://github.com/rust-lang/rust").unwrap();
        let matches = registry.match_for_url(&url);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].host, "github.com");
    }

    #[test]
    fn apply_pattern_updates_confidence_and_emits_events() {
        let registry = PatternRegistry::new();
        registry.bootstrap();
        let id = registry.snapshot()[0].id.clone();
        let events = registry.apply_pattern(
            &id,
            ApplyOutcome::Failure { reason: FailureReason::Timeout },
        );
        assert!(events.iter().any(|e| matches!(e, PatternEvent::Applied { success: false, .. })));
    }

    #[test]
    fn cleanup_removes_low_confidence_patterns() {
        let registry = PatternRegistry::new();
        registry.bootstrap();
        let id = registry.snapshot()[0].id.clone();
        for _ in 0..20 {
            registry.apply_pattern(&id, ApplyOutcome::Failure { reason: FailureReason::Unknown });
        }
        let events = registry.cleanup(Utc::now(), 90, 0.5);
        assert!(!events.is_empty());
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn patterns_for_host_returns_only_that_hosts_patterns() {
        let registry = PatternRegistry::new();
        registry.bootstrap();
        let patterns = registry.patterns_for_host("github.com");
        assert!(!patterns.is_empty());
        assert!(patterns.iter().all(|p| p.host == "github.com"));
        assert!(registry.patterns_for_host("never-seen.example").is_empty());
    }

    #[test]
    fn learn_registers_a_new_pattern_for_an_uncovered_host() {
        let registry = PatternRegistry::new();
        let url = Url::parse("https://blog.example.com/posts/hello").unwrap();
        let event = registry.learn(&url, "https://blog.example.com/posts/hello.json").unwrap();
        assert!(matches!(event, PatternEvent::Learned { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn learn_from_probe_tags_fuzzing_source_and_moderate_confidence() {
        let registry = PatternRegistry::new();
        let url = Url::parse("https://api.example.com/v1/health").unwrap();
        registry.learn_from_probe(&url, "https://api.example.com/v1/health", true).unwrap();
        let pattern = registry.snapshot().into_iter().next().unwrap();
        assert_eq!(pattern.source, crate::pattern::PatternSource::Fuzzing);
        assert_eq!(pattern.confidence, 0.8);
        assert!(pattern.required_fields.contains(&"authorization".to_string()));
    }
}
