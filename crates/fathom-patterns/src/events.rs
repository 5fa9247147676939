//! `PatternEvent`: emitted by the registry, consumed by `fathom-learning`
//! (spec.md §4.2).

use fathom_types::FailureReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveReason {
    LowConfidence,
    Idle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PatternEvent {
    Applied {
        pattern_id: String,
        success: bool,
        latency_ms: Option<f64>,
        failure_reason: Option<FailureReason>,
    },
    ConfidenceChanged {
        pattern_id: String,
        old_confidence: f64,
        new_confidence: f64,
    },
    Archived {
        pattern_id: String,
        reason: ArchiveReason,
    },
    Learned {
        pattern_id: String,
        host: String,
    },
}
