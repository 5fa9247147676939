//! Next-change prediction (spec.md §4.3 "Prediction").

use crate::classify::{Classification, PatternType, TemporalInfo};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_at: DateTime<Utc>,
    pub uncertainty_window_ms: i64,
    pub confidence: f64,
    pub reason: String,
}

/// Derive the next prediction from a classification, or `None` when the
/// pattern type carries no actionable temporal signal (e.g. `static`, whose
/// "next change" is unknowable).
pub fn predict(classification: &Classification, now: DateTime<Utc>, tolerance_hours: f64) -> Option<Prediction> {
    let Classification { pattern_type, confidence, temporal } = classification;

    let (predicted_at, reason) = match pattern_type {
        PatternType::Static => return None,
        PatternType::Hourly => {
            let mean = temporal.mean_interval_hours.unwrap_or(1.0);
            (now + Duration::minutes((mean * 60.0) as i64), "hourly cadence".to_string())
        }
        PatternType::Daily | PatternType::Workday => {
            (next_occurrence_of_hour(now, temporal), "typical daily hour".to_string())
        }
        PatternType::Weekly => (
            next_occurrence_of_weekday(now, temporal),
            "typical weekly weekday".to_string(),
        ),
        PatternType::Monthly => (
            next_occurrence_of_day_of_month(now, temporal),
            "typical day of month".to_string(),
        ),
        PatternType::Irregular => {
            (now + Duration::hours(24), "irregular, default horizon".to_string())
        }
    };

    let uncertainty_window_ms = (tolerance_hours * 3_600_000.0) as i64;
    let decayed_confidence = decay_confidence(*confidence, predicted_at - now, *pattern_type);

    Some(Prediction {
        predicted_at,
        uncertainty_window_ms,
        confidence: decayed_confidence,
        reason,
    })
}

/// Confidence decays with horizon (spec.md §4.3 "Prediction"): ×0.85 beyond
/// 24h, ×0.7 beyond 72h, ×0.6 for `irregular` regardless of horizon.
fn decay_confidence(confidence: f64, horizon: Duration, pattern_type: PatternType) -> f64 {
    let mut decayed = confidence;
    if pattern_type == PatternType::Irregular {
        decayed *= 0.6;
    }
    if horizon > Duration::hours(72) {
        decayed *= 0.7;
    } else if horizon > Duration::hours(24) {
        decayed *= 0.85;
    }
    decayed
}

fn next_occurrence_of_hour(now: DateTime<Utc>, temporal: &TemporalInfo) -> DateTime<Utc> {
    let Some(hour) = temporal.typical_hour else {
        return now + Duration::hours(24);
    };
    let target_hour = hour.floor() as u32 % 24;
    let target_minute = ((hour.fract()) * 60.0).round() as u32 % 60;

    let mut candidate = now
        .date_naive()
        .and_hms_opt(target_hour, target_minute, 0)
        .map(|ndt| ndt.and_utc())
        .unwrap_or(now);
    if candidate <= now {
        candidate += Duration::days(1);
    }
    candidate
}

fn next_occurrence_of_weekday(now: DateTime<Utc>, temporal: &TemporalInfo) -> DateTime<Utc> {
    use chrono::Datelike;
    if temporal.typical_weekdays.is_empty() {
        return now + Duration::days(7);
    }
    let today = now.weekday().num_days_from_monday();
    let mut best: Option<i64> = None;
    for &target in &temporal.typical_weekdays {
        let mut delta = target as i64 - today as i64;
        if delta <= 0 {
            delta += 7;
        }
        best = Some(best.map_or(delta, |b| b.min(delta)));
    }
    now + Duration::days(best.unwrap_or(7))
}

fn next_occurrence_of_day_of_month(now: DateTime<Utc>, temporal: &TemporalInfo) -> DateTime<Utc> {
    use chrono::Datelike;
    if temporal.typical_days_of_month.is_empty() {
        return now + Duration::days(30);
    }
    let today = now.day();
    let mut best: Option<u32> = None;
    for &target in &temporal.typical_days_of_month {
        let delta = if target >= today {
            target - today
        } else {
            target + 30 - today
        };
        best = Some(best.map_or(delta, |b| b.min(delta)));
    }
    now + Duration::days(best.unwrap_or(30) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TemporalInfo;

    #[test]
    fn static_pattern_has_no_prediction() {
        let classification = Classification {
            pattern_type: PatternType::Static,
            confidence: 0.8,
            temporal: TemporalInfo::default(),
        };
        assert!(predict(&classification, Utc::now(), 1.0).is_none());
    }

    #[test]
    fn long_horizon_predictions_decay_confidence() {
        let classification = Classification {
            pattern_type: PatternType::Monthly,
            confidence: 0.9,
            temporal: TemporalInfo {
                typical_days_of_month: vec![1],
                ..Default::default()
            },
        };
        let prediction = predict(&classification, Utc::now(), 1.0).unwrap();
        assert!(prediction.confidence < 0.9);
    }

    #[test]
    fn irregular_pattern_decays_to_sixty_percent() {
        let classification = Classification {
            pattern_type: PatternType::Irregular,
            confidence: 0.5,
            temporal: TemporalInfo::default(),
        };
        let prediction = predict(&classification, Utc::now(), 1.0).unwrap();
        assert!((prediction.confidence - 0.3).abs() < 1e-6 || prediction.confidence <= 0.3 + 1e-6);
    }
}
