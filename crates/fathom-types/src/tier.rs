//! The three render tiers and their relative cost/latency.
//!
//! Grounded on `riptide-reliability::engine_selection::Engine`: a small,
//! `Copy`, `FromStr`/`Display` enum with an integer cost used to order a
//! cascade, generalized here from {Raw, Wasm, Headless} to the three
//! render strategies spec.md §4.1 defines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A render strategy, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Pattern-lookup + direct HTTP GET of a derived API endpoint. No browser.
    Intelligence,
    /// HTTP GET + server-side DOM parse. No JS execution.
    Lightweight,
    /// Full browser: waits, scrolling, session reuse, network/console capture.
    Playwright,
}

impl Tier {
    /// Relative cost unit from spec.md §4.1 (`intelligence`=1, `lightweight`=5,
    /// `playwright`=25).
    pub const fn cost(&self) -> u32 {
        match self {
            Tier::Intelligence => 1,
            Tier::Lightweight => 5,
            Tier::Playwright => 25,
        }
    }

    /// Typical latency used by the cascade's budget-feasibility check.
    pub const fn typical_latency_ms(&self) -> u64 {
        match self {
            Tier::Intelligence => 300,
            Tier::Lightweight => 1_500,
            Tier::Playwright => 6_000,
        }
    }

    /// All tiers in cascade order, cheapest first.
    pub const fn cascade_order() -> [Tier; 3] {
        [Tier::Intelligence, Tier::Lightweight, Tier::Playwright]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Tier::Intelligence => "intelligence",
            Tier::Lightweight => "lightweight",
            Tier::Playwright => "playwright",
        }
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intelligence" => Ok(Tier::Intelligence),
            "lightweight" => Ok(Tier::Lightweight),
            "playwright" => Ok(Tier::Playwright),
            _ => anyhow::bail!(
                "invalid tier: {s}. must be one of: intelligence, lightweight, playwright"
            ),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_ordering_matches_cascade_order() {
        let order = Tier::cascade_order();
        for pair in order.windows(2) {
            assert!(pair[0].cost() < pair[1].cost());
        }
    }

    #[test]
    fn from_str_roundtrips_through_display() {
        for t in Tier::cascade_order() {
            let s = t.to_string();
            assert_eq!(s.parse::<Tier>().unwrap(), t);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("quantum".parse::<Tier>().is_err());
    }

    #[test]
    fn ord_respects_cost() {
        assert!(Tier::Intelligence < Tier::Lightweight);
        assert!(Tier::Lightweight < Tier::Playwright);
    }
}
