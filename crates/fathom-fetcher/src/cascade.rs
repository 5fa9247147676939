//! Tier-candidate selection (spec.md §4.1 "Selection algorithm").

use fathom_types::{Freshness, Tier};

/// Seed the cascade with every tier at or below `max_cost_tier`, cheapest
/// first, then move a success-weighted `preferred` tier to the front.
///
/// `freshness = Realtime` forbids a cache-only read; the Intelligence
/// adapter in this workspace always performs a live GET (it has no cache
/// layer of its own), so its pattern-direct path is never removed here —
/// only a caching variant of that adapter would need to drop out.
pub fn select_candidates(max_cost_tier: Tier, _freshness: Freshness, preferred: Option<Tier>) -> Vec<Tier> {
    let mut order: Vec<Tier> =
        Tier::cascade_order().into_iter().filter(|t| t.cost() <= max_cost_tier.cost()).collect();

    if let Some(pref) = preferred {
        if let Some(pos) = order.iter().position(|t| *t == pref) {
            order.remove(pos);
            order.insert(0, pref);
        }
    }

    order
}
