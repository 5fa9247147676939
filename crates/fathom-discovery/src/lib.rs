//! C10: the Discovery Orchestrator — bounded, idempotent, backgrounded API
//! path probing that feeds the Learning Engine (spec.md §4.6).

mod gate;
mod orchestrator;
mod paths;
mod probe;

pub use gate::{LiveRequestGate, LiveRequestGuard};
pub use orchestrator::{DiscoveryOrchestrator, SweepSummary};
pub use paths::PROBE_TARGETS;
pub use probe::{classify_status, ProbeOutcome};
