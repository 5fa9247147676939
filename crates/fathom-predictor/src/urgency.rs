//! Urgency scoring and calendar triggers (spec.md §4.3 "Urgency levels",
//! "Calendar triggers").

use crate::classify::PatternType;
use crate::prediction::Prediction;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Urgency {
    Static = 0,
    Normal = 1,
    ApproachingWindow = 2,
    Critical = 3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarTrigger {
    pub month: u32,
    pub day: u32,
    pub years_observed: usize,
    pub confidence: f64,
}

/// Group change timestamps by `(month, day-of-month)`; a tuple observed in
/// `>= min_observations` distinct years becomes a trigger.
pub fn derive_calendar_triggers(
    change_timestamps: &[DateTime<Utc>],
    min_observations: usize,
) -> Vec<CalendarTrigger> {
    let mut groups: HashMap<(u32, u32), Vec<i32>> = HashMap::new();
    for ts in change_timestamps {
        groups
            .entry((ts.month(), ts.day()))
            .or_default()
            .push(ts.year());
    }

    let mut triggers = Vec::new();
    for ((month, day), mut years) in groups {
        years.sort_unstable();
        years.dedup();
        if years.len() >= min_observations {
            let confidence = (0.5 + 0.15 * years.len() as f64).min(0.95);
            triggers.push(CalendarTrigger {
                month,
                day,
                years_observed: years.len(),
                confidence,
            });
        }
    }
    triggers.sort_by_key(|t| (t.month, t.day));
    triggers
}

/// Urgency levels (0-3): static -> 0, normal -> 1, approaching a prediction
/// window by `early_check_window_hours` -> 2, within `calendar_trigger_lead_days`
/// of a trigger with confidence >= 0.7 -> 3.
pub fn compute_urgency(
    pattern_type: PatternType,
    prediction: Option<&Prediction>,
    now: DateTime<Utc>,
    early_check_window_hours: f64,
    calendar_triggers: &[CalendarTrigger],
    calendar_trigger_lead_days: i64,
) -> Urgency {
    if pattern_type == PatternType::Static {
        return Urgency::Static;
    }

    for trigger in calendar_triggers {
        if trigger.confidence < 0.7 {
            continue;
        }
        if days_until_annual_date(now, trigger.month, trigger.day) <= calendar_trigger_lead_days {
            return Urgency::Critical;
        }
    }

    if let Some(prediction) = prediction {
        let window_start =
            prediction.predicted_at - chrono::Duration::hours(early_check_window_hours as i64);
        if now >= window_start && now <= prediction.predicted_at + chrono::Duration::hours(early_check_window_hours as i64) {
            return Urgency::ApproachingWindow;
        }
    }

    Urgency::Normal
}

/// Days from `now` to the next occurrence of `(month, day)`, clamped to `>= 0`.
fn days_until_annual_date(now: DateTime<Utc>, month: u32, day: u32) -> i64 {
    let year = now.year();
    let this_year = chrono::NaiveDate::from_ymd_opt(year, month, day);
    let candidate = this_year
        .filter(|d| *d >= now.date_naive())
        .or_else(|| chrono::NaiveDate::from_ymd_opt(year + 1, month, day));
    match candidate {
        Some(date) => (date - now.date_naive()).num_days().max(0),
        None => i64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn static_pattern_is_always_urgency_zero() {
        let urgency = compute_urgency(PatternType::Static, None, Utc::now(), 6.0, &[], 3);
        assert_eq!(urgency, Urgency::Static);
    }

    #[test]
    fn no_trigger_or_window_is_normal() {
        let urgency = compute_urgency(PatternType::Irregular, None, Utc::now(), 6.0, &[], 3);
        assert_eq!(urgency, Urgency::Normal);
    }

    #[test]
    fn three_years_of_jan_first_promotes_to_critical_near_year_end() {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 12, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let timestamps = vec![
            chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc(),
        ];
        let triggers = derive_calendar_triggers(&timestamps, 3);
        assert_eq!(triggers.len(), 1);
        assert!(triggers[0].confidence >= 0.7);

        let urgency = compute_urgency(PatternType::Irregular, None, now, 6.0, &triggers, 3);
        assert_eq!(urgency, Urgency::Critical);
    }

    #[test]
    fn prediction_window_raises_urgency() {
        let now = Utc::now();
        let prediction = Prediction {
            predicted_at: now + Duration::hours(2),
            uncertainty_window_ms: 0,
            confidence: 0.6,
            reason: "test".to_string(),
        };
        let urgency = compute_urgency(PatternType::Daily, Some(&prediction), now, 6.0, &[], 3);
        assert_eq!(urgency, Urgency::ApproachingWindow);
    }
}
