//! Backpressure against live traffic (spec.md §5 "Discovery Orchestrator is
//! strictly lower priority than live requests and yields if the live-request
//! queue is non-empty"). A live request wraps its `browse()` call in a
//! [`LiveRequestGate::guard`]; the orchestrator checks [`LiveRequestGate::
//! is_busy`] between probes and backs off while any are in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct LiveRequestGate(Arc<AtomicUsize>);

impl LiveRequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }

    /// Mark one live request in flight for the lifetime of the returned
    /// guard.
    pub fn guard(&self) -> LiveRequestGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        LiveRequestGuard(self.0.clone())
    }
}

pub struct LiveRequestGuard(Arc<AtomicUsize>);

impl Drop for LiveRequestGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_only_while_a_guard_is_held() {
        let gate = LiveRequestGate::new();
        assert!(!gate.is_busy());
        let guard = gate.guard();
        assert!(gate.is_busy());
        drop(guard);
        assert!(!gate.is_busy());
    }

    #[test]
    fn multiple_guards_stack() {
        let gate = LiveRequestGate::new();
        let a = gate.guard();
        let b = gate.guard();
        drop(a);
        assert!(gate.is_busy());
        drop(b);
        assert!(!gate.is_busy());
    }
}
