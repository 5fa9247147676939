//! Centralised configuration, covering every key in spec.md §6.3.
//!
//! Grounded on `riptide-config::env::EnvConfigLoader`'s prefix+default
//! pattern: env vars follow the same tree with `SNAKE_CASE` names under a
//! `FATHOM_` prefix, and an explicit struct passed by the caller always
//! overrides whatever `from_env()` would have produced.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub max_patterns: usize,
    pub min_confidence_threshold: f64,
    pub archive_after_days: i64,
    pub persist_debounce_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_patterns: 500,
            min_confidence_threshold: 0.10,
            archive_after_days: 90,
            persist_debounce_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub min_changes_for_pattern: usize,
    pub min_observations_for_pattern: usize,
    pub time_of_day_tolerance_hours: f64,
    pub static_content_days_threshold: i64,
    pub min_poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
    pub confidence_threshold_for_prediction: f64,
    pub calendar_trigger_lead_days: i64,
    pub max_observations_to_keep: usize,
    pub max_change_timestamps: usize,
    pub min_calendar_trigger_observations: usize,
    pub early_check_window_hours: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_changes_for_pattern: 3,
            min_observations_for_pattern: 5,
            time_of_day_tolerance_hours: 1.0,
            static_content_days_threshold: 30,
            min_poll_interval_ms: Duration::from_secs(5 * 60).as_millis() as u64,
            max_poll_interval_ms: Duration::from_secs(24 * 60 * 60).as_millis() as u64,
            confidence_threshold_for_prediction: 0.55,
            calendar_trigger_lead_days: 3,
            max_observations_to_keep: 200,
            max_change_timestamps: 100,
            min_calendar_trigger_observations: 2,
            early_check_window_hours: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub max_concurrent_playwright: usize,
    pub default_max_latency_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_playwright: 4,
            default_max_latency_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    pub dimensions: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

/// Discovery Orchestrator (C10) tuning, spec.md §4.6. Not in the explicit
/// key table of §6.3 since the spec leaves the exact budget to the
/// implementation ("rate-limited and budget-capped") — defaults are chosen
/// to keep probing strictly background-priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub max_duration_ms: u64,
    pub probe_timeout_ms: u64,
    pub domain_ttl_secs: i64,
    pub max_concurrent_probes: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 5_000,
            probe_timeout_ms: 1_500,
            domain_ttl_secs: 24 * 60 * 60,
            max_concurrent_probes: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FathomConfig {
    pub registry: RegistryConfig,
    pub predictor: PredictorConfig,
    pub fetcher: FetcherConfig,
    pub vector: VectorConfig,
    pub discovery: DiscoveryConfig,
}

impl FathomConfig {
    /// Load from `FATHOM_*` environment variables, falling back to each
    /// field's documented default when the variable is absent or
    /// unparsable. Call sites should overlay an explicit struct on top of
    /// this where the caller wants env values ignored — explicit always
    /// wins over env per spec.md §6.3.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_usize("FATHOM_REGISTRY_MAX_PATTERNS") {
            config.registry.max_patterns = v;
        }
        if let Some(v) = env_f64("FATHOM_REGISTRY_MIN_CONFIDENCE_THRESHOLD") {
            config.registry.min_confidence_threshold = v;
        }
        if let Some(v) = env_i64("FATHOM_REGISTRY_ARCHIVE_AFTER_DAYS") {
            config.registry.archive_after_days = v;
        }
        if let Some(v) = env_u64("FATHOM_REGISTRY_PERSIST_DEBOUNCE_MS") {
            config.registry.persist_debounce_ms = v;
        }

        if let Some(v) = env_usize("FATHOM_PREDICTOR_MIN_CHANGES_FOR_PATTERN") {
            config.predictor.min_changes_for_pattern = v;
        }
        if let Some(v) = env_usize("FATHOM_PREDICTOR_MIN_OBSERVATIONS_FOR_PATTERN") {
            config.predictor.min_observations_for_pattern = v;
        }
        if let Some(v) = env_u64("FATHOM_PREDICTOR_MIN_POLL_INTERVAL_MS") {
            config.predictor.min_poll_interval_ms = v;
        }
        if let Some(v) = env_u64("FATHOM_PREDICTOR_MAX_POLL_INTERVAL_MS") {
            config.predictor.max_poll_interval_ms = v;
        }
        if let Some(v) = env_f64("FATHOM_PREDICTOR_CONFIDENCE_THRESHOLD_FOR_PREDICTION") {
            config.predictor.confidence_threshold_for_prediction = v;
        }
        if let Some(v) = env_i64("FATHOM_PREDICTOR_CALENDAR_TRIGGER_LEAD_DAYS") {
            config.predictor.calendar_trigger_lead_days = v;
        }

        if let Some(v) = env_usize("FATHOM_FETCHER_MAX_CONCURRENT_PLAYWRIGHT") {
            config.fetcher.max_concurrent_playwright = v;
        }
        if let Some(v) = env_u64("FATHOM_FETCHER_DEFAULT_BUDGET_MAX_LATENCY_MS") {
            config.fetcher.default_max_latency_ms = v;
        }

        if let Some(v) = env_usize("FATHOM_VECTOR_DIMENSIONS") {
            config.vector.dimensions = v;
        }

        if let Some(v) = env_u64("FATHOM_DISCOVERY_MAX_DURATION_MS") {
            config.discovery.max_duration_ms = v;
        }
        if let Some(v) = env_u64("FATHOM_DISCOVERY_PROBE_TIMEOUT_MS") {
            config.discovery.probe_timeout_ms = v;
        }
        if let Some(v) = env_i64("FATHOM_DISCOVERY_DOMAIN_TTL_SECS") {
            config.discovery.domain_ttl_secs = v;
        }

        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok()?.parse().ok()
}
fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok()?.parse().ok()
}
fn env_i64(key: &str) -> Option<i64> {
    env::var(key).ok()?.parse().ok()
}
fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = FathomConfig::default();
        assert_eq!(config.registry.max_patterns, 500);
        assert_eq!(config.registry.min_confidence_threshold, 0.10);
        assert_eq!(config.registry.archive_after_days, 90);
        assert_eq!(config.registry.persist_debounce_ms, 5_000);
        assert_eq!(config.predictor.min_changes_for_pattern, 3);
        assert_eq!(config.predictor.min_observations_for_pattern, 5);
        assert_eq!(config.predictor.min_poll_interval_ms, 5 * 60 * 1000);
        assert_eq!(config.predictor.max_poll_interval_ms, 24 * 60 * 60 * 1000);
        assert_eq!(config.fetcher.max_concurrent_playwright, 4);
        assert_eq!(config.fetcher.default_max_latency_ms, 10_000);
        assert_eq!(config.vector.dimensions, 384);
    }

    #[test]
    fn env_override_takes_effect() {
        // SAFETY: test-local env var, no concurrent mutation in this process.
        unsafe {
            env::set_var("FATHOM_VECTOR_DIMENSIONS", "768");
        }
        let config = FathomConfig::from_env();
        assert_eq!(config.vector.dimensions, 768);
        unsafe {
            env::remove_var("FATHOM_VECTOR_DIMENSIONS");
        }
    }
}
