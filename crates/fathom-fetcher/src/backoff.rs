//! In-tier retry backoff for `network`/`timeout` failures (spec.md §4.1).
//!
//! Exponential with jitter, grounded on the same shape as
//! `fathom_adapters::state::RenderAdapterState`'s cooldown: a small, pure
//! function over attempt count rather than a stateful timer.

use rand::Rng;
use std::time::Duration;

pub const MAX_ATTEMPTS_PER_TIER: u32 = 3;
const BASE_MS: u64 = 500;
const FACTOR: u64 = 2;
const JITTER_FRACTION: f64 = 0.2;

/// Delay before retry attempt `attempt` (1-indexed: the first retry is
/// `attempt = 1`), capped so it never exceeds `remaining_budget_ms`. Returns
/// `None` once `attempt` reaches [`MAX_ATTEMPTS_PER_TIER`] or the budget is
/// exhausted.
pub fn next_delay(attempt: u32, remaining_budget_ms: u64) -> Option<Duration> {
    if attempt >= MAX_ATTEMPTS_PER_TIER || remaining_budget_ms == 0 {
        return None;
    }
    let base = BASE_MS.saturating_mul(FACTOR.saturating_pow(attempt - 1));
    let jitter_span = (base as f64 * JITTER_FRACTION) as i64;
    let jitter = rand::thread_rng().gen_range(-jitter_span..=jitter_span);
    let delayed = (base as i64 + jitter).max(0) as u64;
    Some(Duration::from_millis(delayed.min(remaining_budget_ms)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_with_attempt_number() {
        let first = next_delay(1, 60_000).unwrap();
        let second = next_delay(2, 60_000).unwrap();
        assert!(second.as_millis() > first.as_millis() / 2);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        assert!(next_delay(MAX_ATTEMPTS_PER_TIER, 60_000).is_none());
    }

    #[test]
    fn capped_by_remaining_budget() {
        let delay = next_delay(1, 10).unwrap();
        assert!(delay.as_millis() <= 10);
    }

    #[test]
    fn zero_budget_yields_no_retry() {
        assert!(next_delay(1, 0).is_none());
    }
}
