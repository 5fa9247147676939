//! Render tier adapters (spec.md §4 "Render Adapters", component C7).

pub mod intelligence;
pub mod lightweight;
pub mod playwright;
pub mod state;

pub use intelligence::IntelligenceAdapter;
pub use lightweight::LightweightAdapter;
pub use playwright::PlaywrightAdapter;
pub use state::{BreakerState, RenderAdapterState};
