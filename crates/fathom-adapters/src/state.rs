//! `RenderAdapterState` (spec.md §3.2): process-wide, per-tier state holding
//! a cached domain preference and a last-error breaker.
//!
//! Grounded on `riptide_reliability::circuit_breaker::CircuitBreakerState`'s
//! `Closed/Open/HalfOpen` shape, simplified to the single failure-count
//! threshold this spec needs (no half-open probe budget).

use fathom_types::Tier;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

pub struct RenderAdapterState {
    pub tier: Tier,
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trip_threshold: u32,
    cooldown: Duration,
}

impl RenderAdapterState {
    pub fn new(tier: Tier, trip_threshold: u32, cooldown: Duration) -> Self {
        Self {
            tier,
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trip_threshold,
            cooldown,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
        self.opened_at = None;
    }

    pub fn record_failure(&mut self, now: Instant) {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.trip_threshold {
            self.state = BreakerState::Open;
            self.opened_at = Some(now);
        }
    }

    /// Whether this tier may currently be attempted. `Open` transitions to
    /// `HalfOpen` once `cooldown` elapses, allowing one probe attempt.
    pub fn is_available(&mut self, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let Some(opened_at) = self.opened_at else { return true };
                if now.duration_since(opened_at) >= self.cooldown {
                    self.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }
}
