//! Content-change frequency analysis, pattern classification, prediction and
//! urgency scoring (spec.md §4.3, component C5).

pub mod accuracy;
pub mod classify;
pub mod observation;
pub mod pattern;
pub mod poll;
pub mod predictor;
pub mod prediction;
pub mod urgency;

pub use accuracy::{accuracy_ratio, record_prediction_accuracy, PredictionAccuracyRecord};
pub use classify::{classify, Classification, ClassifyConfig, PatternType, TemporalInfo};
pub use observation::{push_bounded, ChangeObservation};
pub use pattern::ContentChangePattern;
pub use poll::{recommended_poll_interval_ms, should_check_now, CheckDecision, PollConfig};
pub use predictor::Predictor;
pub use prediction::{predict, Prediction};
pub use urgency::{compute_urgency, derive_calendar_triggers, CalendarTrigger, Urgency};
