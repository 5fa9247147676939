//! `Predictor`: registry of [`ContentChangePattern`]s keyed by
//! `(domain, url-pattern)`, mirroring `fathom_patterns::PatternRegistry`'s
//! `DashMap`-backed shape.

use crate::observation::ChangeObservation;
use crate::pattern::ContentChangePattern;
use crate::poll::CheckDecision;
use crate::urgency::Urgency;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fathom_types::PredictorConfig;

type Key = (String, String);

pub struct Predictor {
    patterns: DashMap<Key, ContentChangePattern>,
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { patterns: DashMap::new(), config }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn record_observation(
        &self,
        domain: &str,
        url_pattern: &str,
        observation: ChangeObservation,
        now: DateTime<Utc>,
    ) {
        let key = (domain.to_string(), url_pattern.to_string());
        let mut entry = self
            .patterns
            .entry(key)
            .or_insert_with(|| ContentChangePattern::new(domain, url_pattern));
        entry.record_observation(observation, &self.config, now);
    }

    pub fn should_check_now(&self, domain: &str, url_pattern: &str, now: DateTime<Utc>) -> CheckDecision {
        let key = (domain.to_string(), url_pattern.to_string());
        match self.patterns.get(&key) {
            Some(pattern) => pattern.should_check_now(&self.config, now),
            None => CheckDecision { poll: true, confidence: 0.0, next_check_at: None },
        }
    }

    pub fn urgency(&self, domain: &str, url_pattern: &str, now: DateTime<Utc>) -> Urgency {
        let key = (domain.to_string(), url_pattern.to_string());
        self.patterns
            .get(&key)
            .map(|pattern| pattern.urgency(&self.config, now))
            .unwrap_or(Urgency::Normal)
    }

    pub fn record_prediction_accuracy(
        &self,
        domain: &str,
        url_pattern: &str,
        actual_changed: bool,
        actual_change_at: Option<DateTime<Utc>>,
    ) {
        let key = (domain.to_string(), url_pattern.to_string());
        if let Some(mut pattern) = self.patterns.get_mut(&key) {
            pattern.record_prediction_accuracy(&self.config, actual_changed, actual_change_at);
        }
    }

    pub fn get(&self, domain: &str, url_pattern: &str) -> Option<ContentChangePattern> {
        let key = (domain.to_string(), url_pattern.to_string());
        self.patterns.get(&key).map(|entry| entry.clone())
    }

    pub fn snapshot(&self) -> Vec<ContentChangePattern> {
        self.patterns.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn restore(&self, patterns: Vec<ContentChangePattern>) {
        for pattern in patterns {
            let key = (pattern.domain.clone(), pattern.url_pattern.clone());
            self.patterns.insert(key, pattern);
        }
    }
}
