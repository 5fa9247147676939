//! Pattern classification (spec.md §4.3 "Pattern classification"). Tested in
//! order; first match wins; remainder fall through to `irregular`.

use crate::observation::ChangeObservation;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternType {
    Static,
    Hourly,
    Daily,
    Workday,
    Weekly,
    Monthly,
    Irregular,
}

/// The temporal detail classification derived, used later to build a
/// [`crate::prediction::Prediction`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalInfo {
    pub typical_hour: Option<f64>,
    pub typical_weekdays: Vec<u32>,
    pub typical_days_of_month: Vec<u32>,
    pub mean_interval_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub pattern_type: PatternType,
    pub confidence: f64,
    pub temporal: TemporalInfo,
}

pub struct ClassifyConfig {
    pub static_content_days_threshold: i64,
    pub time_of_day_tolerance_hours: f64,
}

pub fn classify(
    observations: &[ChangeObservation],
    change_timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    config: &ClassifyConfig,
) -> Classification {
    if let Some(c) = try_static(change_timestamps, now, config) {
        return c;
    }
    if let Some(c) = try_hourly(change_timestamps) {
        return c;
    }
    if let Some(c) = try_daily(change_timestamps, config) {
        return c;
    }
    if let Some(c) = try_workday(change_timestamps) {
        return c;
    }
    if let Some(c) = try_weekly(change_timestamps) {
        return c;
    }
    if let Some(c) = try_monthly(change_timestamps) {
        return c;
    }
    let _ = observations;
    irregular()
}

fn irregular() -> Classification {
    Classification {
        pattern_type: PatternType::Irregular,
        confidence: 0.5,
        temporal: TemporalInfo::default(),
    }
}

fn try_static(
    change_timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    config: &ClassifyConfig,
) -> Option<Classification> {
    let last_change = change_timestamps.last()?;
    let days_since = (now - *last_change).num_days();
    if days_since > config.static_content_days_threshold {
        return Some(Classification {
            pattern_type: PatternType::Static,
            confidence: 0.8,
            temporal: TemporalInfo::default(),
        });
    }
    None
}

fn try_hourly(change_timestamps: &[DateTime<Utc>]) -> Option<Classification> {
    let intervals = inter_change_hours(change_timestamps)?;
    let mean = mean_of(&intervals);
    if !(0.5..=12.0).contains(&mean) {
        return None;
    }
    let std_dev = std_dev_of(&intervals, mean);
    if mean == 0.0 || std_dev / mean > 0.20 {
        return None;
    }
    let consistency = 1.0 - (std_dev / mean).min(1.0);
    if consistency <= 0.7 {
        return None;
    }
    Some(Classification {
        pattern_type: PatternType::Hourly,
        confidence: consistency,
        temporal: TemporalInfo {
            mean_interval_hours: Some(mean),
            ..Default::default()
        },
    })
}

fn try_daily(change_timestamps: &[DateTime<Utc>], config: &ClassifyConfig) -> Option<Classification> {
    if change_timestamps.is_empty() {
        return None;
    }
    let distinct_days: HashSet<_> = change_timestamps.iter().map(|t| t.date_naive()).collect();
    if distinct_days.len() < 3 {
        return None;
    }

    let hours: Vec<f64> = change_timestamps
        .iter()
        .map(|t| t.hour() as f64 + t.minute() as f64 / 60.0)
        .collect();
    let common_hour = mode_hour(&hours);
    let tolerance = config.time_of_day_tolerance_hours;
    let matches = hours
        .iter()
        .filter(|h| hour_distance(**h, common_hour) <= tolerance)
        .count();
    let match_ratio = matches as f64 / hours.len() as f64;

    if match_ratio < 0.60 {
        return None;
    }
    Some(Classification {
        pattern_type: PatternType::Daily,
        confidence: match_ratio * 0.9,
        temporal: TemporalInfo {
            typical_hour: Some(common_hour),
            ..Default::default()
        },
    })
}

fn try_workday(change_timestamps: &[DateTime<Utc>]) -> Option<Classification> {
    if change_timestamps.is_empty() {
        return None;
    }
    let weekday_count = change_timestamps
        .iter()
        .filter(|t| t.weekday().num_days_from_monday() < 5)
        .count();
    let weekend_count = change_timestamps.len() - weekday_count;
    let weekday_ratio = weekday_count as f64 / change_timestamps.len() as f64;

    if weekday_ratio >= 0.85 && weekend_count <= 1 {
        return Some(Classification {
            pattern_type: PatternType::Workday,
            confidence: weekday_ratio,
            temporal: TemporalInfo {
                typical_weekdays: (0..5).collect(),
                ..Default::default()
            },
        });
    }
    None
}

fn try_weekly(change_timestamps: &[DateTime<Utc>]) -> Option<Classification> {
    if change_timestamps.is_empty() {
        return None;
    }
    let distinct_weeks: HashSet<_> = change_timestamps
        .iter()
        .map(|t| (t.iso_week().year(), t.iso_week().week()))
        .collect();
    if distinct_weeks.len() < 3 {
        return None;
    }

    let (typical, match_ratio) = top_n_by_frequency(
        change_timestamps.iter().map(|t| t.weekday().num_days_from_monday()),
        change_timestamps.len(),
        3,
    );

    if match_ratio < 0.70 {
        return None;
    }
    Some(Classification {
        pattern_type: PatternType::Weekly,
        confidence: match_ratio * 0.85,
        temporal: TemporalInfo {
            typical_weekdays: typical,
            ..Default::default()
        },
    })
}

fn try_monthly(change_timestamps: &[DateTime<Utc>]) -> Option<Classification> {
    if change_timestamps.is_empty() {
        return None;
    }
    let distinct_months: HashSet<_> = change_timestamps.iter().map(|t| (t.year(), t.month())).collect();
    if distinct_months.len() < 2 {
        return None;
    }

    let (typical, match_ratio) = top_n_by_frequency(
        change_timestamps.iter().map(|t| t.day()),
        change_timestamps.len(),
        3,
    );

    if match_ratio < 0.70 {
        return None;
    }
    Some(Classification {
        pattern_type: PatternType::Monthly,
        confidence: match_ratio * 0.8,
        temporal: TemporalInfo {
            typical_days_of_month: typical,
            ..Default::default()
        },
    })
}

fn inter_change_hours(timestamps: &[DateTime<Utc>]) -> Option<Vec<f64>> {
    if timestamps.len() < 2 {
        return None;
    }
    let mut sorted = timestamps.to_vec();
    sorted.sort();
    Some(
        sorted
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds() as f64 / 3600.0)
            .collect(),
    )
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev_of(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Bucket hours to the nearest whole hour and return the most frequent one.
fn mode_hour(hours: &[f64]) -> f64 {
    let mut buckets: HashMap<u32, usize> = HashMap::new();
    for h in hours {
        *buckets.entry(h.round() as u32 % 24).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(hour, _)| hour as f64)
        .unwrap_or(0.0)
}

fn hour_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 24.0;
    diff.min(24.0 - diff)
}

/// Rank values by frequency, take enough of the top ones (up to `max_count`)
/// to reach cumulative coverage, and return (the chosen values, the
/// resulting match ratio against `total`).
fn top_n_by_frequency<T, I>(values: I, total: usize, max_count: usize) -> (Vec<T>, f64)
where
    T: Eq + std::hash::Hash + Copy + Ord,
    I: Iterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut ranked: Vec<(T, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut chosen = Vec::new();
    let mut covered = 0usize;
    for (value, count) in ranked.into_iter().take(max_count) {
        chosen.push(value);
        covered += count;
    }

    let ratio = if total == 0 { 0.0 } else { covered as f64 / total as f64 };
    (chosen, ratio)
}
