//! `ContentChangePattern`: the per-(domain, url-pattern) record tying
//! observation, classification, prediction, urgency and accuracy together
//! (spec.md §4.3 "Data model").

use crate::accuracy::{accuracy_ratio, record_prediction_accuracy, PredictionAccuracyRecord};
use crate::classify::{classify, Classification, ClassifyConfig, PatternType};
use crate::observation::{push_bounded, ChangeObservation};
use crate::poll::{recommended_poll_interval_ms, should_check_now, CheckDecision, PollConfig};
use crate::prediction::{predict, Prediction};
use crate::urgency::{compute_urgency, derive_calendar_triggers, CalendarTrigger, Urgency};
use chrono::{DateTime, Utc};
use fathom_types::PredictorConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChangePattern {
    pub domain: String,
    pub url_pattern: String,
    pub observations: VecDeque<ChangeObservation>,
    pub change_timestamps: VecDeque<DateTime<Utc>>,
    pub classification: Option<Classification>,
    pub prediction: Option<Prediction>,
    pub calendar_triggers: Vec<CalendarTrigger>,
    pub accuracy_records: VecDeque<PredictionAccuracyRecord>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ContentChangePattern {
    pub fn new(domain: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            url_pattern: url_pattern.into(),
            observations: VecDeque::new(),
            change_timestamps: VecDeque::new(),
            classification: None,
            prediction: None,
            calendar_triggers: Vec::new(),
            accuracy_records: VecDeque::new(),
            last_checked_at: None,
        }
    }

    /// Record a check, append the observation, and re-derive the pattern once
    /// there's enough history (`minChangesForPattern` / `minObservationsForPattern`).
    pub fn record_observation(
        &mut self,
        observation: ChangeObservation,
        config: &PredictorConfig,
        now: DateTime<Utc>,
    ) {
        self.last_checked_at = Some(observation.checked_at);
        if observation.changed {
            push_bounded(&mut self.change_timestamps, observation.checked_at, config.max_change_timestamps);
        }
        push_bounded(&mut self.observations, observation, config.max_observations_to_keep);

        if self.observations.len() >= config.min_observations_for_pattern
            && self.change_timestamps.len() >= config.min_changes_for_pattern
        {
            self.analyze_and_update(config, now);
        }
    }

    fn analyze_and_update(&mut self, config: &PredictorConfig, now: DateTime<Utc>) {
        let classify_config = ClassifyConfig {
            static_content_days_threshold: config.static_content_days_threshold,
            time_of_day_tolerance_hours: config.time_of_day_tolerance_hours,
        };
        let observations: Vec<_> = self.observations.iter().cloned().collect();
        let timestamps: Vec<_> = self.change_timestamps.iter().cloned().collect();

        let classification = classify(&observations, &timestamps, now, &classify_config);
        self.prediction = if classification.confidence >= config.confidence_threshold_for_prediction {
            predict(&classification, now, config.time_of_day_tolerance_hours)
        } else {
            None
        };
        self.calendar_triggers =
            derive_calendar_triggers(&timestamps, config.min_calendar_trigger_observations);
        self.classification = Some(classification);
    }

    pub fn pattern_type(&self) -> Option<PatternType> {
        self.classification.as_ref().map(|c| c.pattern_type)
    }

    pub fn confidence(&self) -> f64 {
        self.classification.as_ref().map_or(0.0, |c| c.confidence)
    }

    pub fn urgency(&self, config: &PredictorConfig, now: DateTime<Utc>) -> Urgency {
        let Some(pattern_type) = self.pattern_type() else {
            return Urgency::Normal;
        };
        compute_urgency(
            pattern_type,
            self.prediction.as_ref(),
            now,
            config.early_check_window_hours,
            &self.calendar_triggers,
            config.calendar_trigger_lead_days,
        )
    }

    pub fn recommended_poll_interval_ms(&self, config: &PredictorConfig) -> u64 {
        let poll_config = PollConfig {
            min_poll_interval_ms: config.min_poll_interval_ms,
            max_poll_interval_ms: config.max_poll_interval_ms,
        };
        let (pattern_type, mean_interval, confidence) = match &self.classification {
            Some(c) => (c.pattern_type, c.temporal.mean_interval_hours, c.confidence),
            None => return config.max_poll_interval_ms,
        };
        recommended_poll_interval_ms(pattern_type, mean_interval, confidence, &poll_config)
    }

    pub fn should_check_now(&self, config: &PredictorConfig, now: DateTime<Utc>) -> CheckDecision {
        let recommended = self.recommended_poll_interval_ms(config);
        should_check_now(
            now,
            self.last_checked_at,
            self.pattern_type(),
            self.confidence(),
            recommended,
            config.max_poll_interval_ms,
            self.prediction.as_ref(),
        )
    }

    /// Feed back the outcome of an actual check against the standing prediction.
    pub fn record_prediction_accuracy(
        &mut self,
        config: &PredictorConfig,
        actual_changed: bool,
        actual_change_at: Option<DateTime<Utc>>,
    ) {
        let Some(prediction) = self.prediction.clone() else {
            return;
        };
        record_prediction_accuracy(
            &mut self.accuracy_records,
            prediction.predicted_at,
            prediction.confidence,
            prediction.uncertainty_window_ms,
            actual_changed,
            actual_change_at,
            config.max_observations_to_keep,
        );
    }

    pub fn accuracy_ratio(&self) -> Option<f64> {
        accuracy_ratio(&self.accuracy_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PredictorConfig {
        PredictorConfig::default()
    }

    #[test]
    fn stays_unclassified_below_minimum_history() {
        let mut pattern = ContentChangePattern::new("example.com", "/news");
        let now = Utc::now();
        pattern.record_observation(
            ChangeObservation { checked_at: now, changed: true, content_hash: None },
            &config(),
            now,
        );
        assert!(pattern.classification.is_none());
    }

    #[test]
    fn classifies_once_enough_history_accumulates() {
        let mut pattern = ContentChangePattern::new("example.com", "/news");
        let config = config();
        let base = Utc::now() - chrono::Duration::days(10);
        for i in 0..6 {
            let checked_at = base + chrono::Duration::days(i);
            pattern.record_observation(
                ChangeObservation { checked_at, changed: true, content_hash: None },
                &config,
                checked_at,
            );
        }
        assert!(pattern.classification.is_some());
    }

    #[test]
    fn accuracy_feedback_requires_a_standing_prediction() {
        let mut pattern = ContentChangePattern::new("example.com", "/news");
        pattern.record_prediction_accuracy(&config(), true, Some(Utc::now()));
        assert!(pattern.accuracy_records.is_empty());
    }
}
