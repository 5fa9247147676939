//! Recommended poll interval and the `shouldCheckNow` decision table
//! (spec.md §4.3).

use crate::classify::PatternType;
use crate::prediction::Prediction;
use chrono::{DateTime, Duration, Utc};

pub struct PollConfig {
    pub min_poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
}

/// Fallback mean interval (hours) for pattern types that don't carry an
/// explicit `mean_interval_hours` (only `hourly` does).
fn default_interval_hours(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::Daily | PatternType::Workday => 24.0,
        PatternType::Weekly => 24.0 * 7.0,
        PatternType::Monthly => 24.0 * 30.0,
        PatternType::Irregular => 24.0,
        PatternType::Hourly => 1.0,
        PatternType::Static => 24.0 * 30.0,
    }
}

pub fn recommended_poll_interval_ms(
    pattern_type: PatternType,
    mean_interval_hours: Option<f64>,
    confidence: f64,
    config: &PollConfig,
) -> u64 {
    if pattern_type == PatternType::Static {
        return config.max_poll_interval_ms;
    }

    let avg_interval_hours = mean_interval_hours.unwrap_or_else(|| default_interval_hours(pattern_type));
    let mut interval_ms = 0.8 * avg_interval_hours * 3_600_000.0;

    if confidence < 0.5 {
        interval_ms *= 0.5;
    } else if confidence < 0.7 {
        interval_ms *= 0.7;
    }
    if pattern_type == PatternType::Irregular {
        interval_ms *= 0.6;
    }

    (interval_ms as u64).clamp(config.min_poll_interval_ms, config.max_poll_interval_ms)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckDecision {
    pub poll: bool,
    pub confidence: f64,
    pub next_check_at: Option<DateTime<Utc>>,
}

/// `shouldCheckNow(domain, url, t)` (spec.md §4.3). `last_check` and
/// `pattern_confidence` are `None`/`0.0` when there's no pattern yet.
#[allow(clippy::too_many_arguments)]
pub fn should_check_now(
    now: DateTime<Utc>,
    last_check: Option<DateTime<Utc>>,
    pattern_type: Option<PatternType>,
    pattern_confidence: f64,
    recommended_interval_ms: u64,
    max_poll_interval_ms: u64,
    prediction: Option<&Prediction>,
) -> CheckDecision {
    let Some(last_check) = last_check else {
        return CheckDecision { poll: true, confidence: 0.0, next_check_at: None };
    };
    let Some(pattern_type) = pattern_type else {
        return CheckDecision { poll: true, confidence: 0.0, next_check_at: None };
    };

    let since_last = now - last_check;

    if pattern_type == PatternType::Static
        && since_last < Duration::milliseconds(max_poll_interval_ms as i64)
    {
        return CheckDecision { poll: false, confidence: pattern_confidence, next_check_at: None };
    }

    let recommended = Duration::milliseconds(recommended_interval_ms as i64);
    if since_last < Duration::milliseconds((recommended_interval_ms as f64 * 0.8) as i64) {
        return CheckDecision { poll: false, confidence: pattern_confidence, next_check_at: None };
    }

    if let Some(prediction) = prediction {
        let window_start = prediction.predicted_at
            - Duration::milliseconds(prediction.uncertainty_window_ms);
        let window_end = prediction.predicted_at
            + Duration::milliseconds(prediction.uncertainty_window_ms);

        if now < window_start && window_start - now > recommended {
            return CheckDecision {
                poll: false,
                confidence: pattern_confidence,
                next_check_at: Some(window_start),
            };
        }
        if now >= window_start && now <= window_end {
            return CheckDecision { poll: true, confidence: prediction.confidence, next_check_at: None };
        }
        if now > window_end {
            return CheckDecision {
                poll: true,
                confidence: pattern_confidence * 0.5,
                next_check_at: None,
            };
        }
    }

    if since_last >= recommended {
        return CheckDecision { poll: true, confidence: pattern_confidence, next_check_at: None };
    }

    CheckDecision { poll: false, confidence: pattern_confidence, next_check_at: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PollConfig {
        PollConfig {
            min_poll_interval_ms: 5 * 60 * 1000,
            max_poll_interval_ms: 24 * 60 * 60 * 1000,
        }
    }

    #[test]
    fn no_pattern_means_poll_with_zero_confidence() {
        let decision = should_check_now(Utc::now(), None, None, 0.0, 0, 0, None);
        assert!(decision.poll);
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn static_pattern_skips_poll_within_max_interval() {
        let now = Utc::now();
        let decision = should_check_now(
            now,
            Some(now - Duration::hours(1)),
            Some(PatternType::Static),
            0.8,
            0,
            24 * 60 * 60 * 1000,
            None,
        );
        assert!(!decision.poll);
    }

    #[test]
    fn recommended_interval_clamped_to_bounds() {
        let ms = recommended_poll_interval_ms(PatternType::Hourly, Some(1.0), 0.9, &config());
        assert!(ms >= config().min_poll_interval_ms);
        assert!(ms <= config().max_poll_interval_ms);
    }

    #[test]
    fn static_pattern_uses_max_poll_interval() {
        let ms = recommended_poll_interval_ms(PatternType::Static, None, 0.9, &config());
        assert_eq!(ms, config().max_poll_interval_ms);
    }

    #[test]
    fn low_confidence_shrinks_recommended_interval() {
        let cfg = config();
        let high = recommended_poll_interval_ms(PatternType::Daily, Some(24.0), 0.9, &cfg);
        let low = recommended_poll_interval_ms(PatternType::Daily, Some(24.0), 0.3, &cfg);
        assert!(low <= high);
    }
}
