//! Prediction accuracy feedback (spec.md §4.3 "Accuracy feedback").

use crate::observation::push_bounded;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionAccuracyRecord {
    pub predicted_at: DateTime<Utc>,
    pub actual_at: Option<DateTime<Utc>>,
    pub was_accurate: bool,
    pub error_ms: Option<i64>,
    pub confidence_at_prediction: f64,
}

/// Called on the actual check against a standing prediction, appending a
/// bounded accuracy record.
pub fn record_prediction_accuracy(
    history: &mut VecDeque<PredictionAccuracyRecord>,
    predicted_at: DateTime<Utc>,
    confidence_at_prediction: f64,
    uncertainty_window_ms: i64,
    actual_changed: bool,
    actual_change_at: Option<DateTime<Utc>>,
    cap: usize,
) {
    let error_ms = actual_change_at.map(|at| (at - predicted_at).num_milliseconds().abs());
    let was_accurate = actual_changed
        && error_ms.is_some_and(|err| err <= uncertainty_window_ms);

    push_bounded(
        history,
        PredictionAccuracyRecord {
            predicted_at,
            actual_at: actual_change_at,
            was_accurate,
            error_ms,
            confidence_at_prediction,
        },
        cap,
    );
}

/// Fraction of the retained history that was accurate; `None` when empty.
pub fn accuracy_ratio(history: &VecDeque<PredictionAccuracyRecord>) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let accurate = history.iter().filter(|r| r.was_accurate).count();
    Some(accurate as f64 / history.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn accurate_when_actual_change_within_window() {
        let mut history = VecDeque::new();
        let predicted_at = Utc::now();
        record_prediction_accuracy(
            &mut history,
            predicted_at,
            0.8,
            3_600_000,
            true,
            Some(predicted_at + Duration::minutes(10)),
            100,
        );
        assert!(history[0].was_accurate);
        assert_eq!(accuracy_ratio(&history), Some(1.0));
    }

    #[test]
    fn inaccurate_when_outside_window_or_no_change() {
        let mut history = VecDeque::new();
        let predicted_at = Utc::now();
        record_prediction_accuracy(&mut history, predicted_at, 0.8, 3_600_000, false, None, 100);
        assert!(!history[0].was_accurate);
        assert_eq!(history[0].error_ms, None);
    }

    #[test]
    fn history_is_bounded() {
        let mut history = VecDeque::new();
        for _ in 0..10 {
            record_prediction_accuracy(&mut history, Utc::now(), 0.5, 1000, false, None, 5);
        }
        assert_eq!(history.len(), 5);
    }
}
