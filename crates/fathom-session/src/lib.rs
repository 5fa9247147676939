//! Per-(domain, profile) session snapshot store with health derivation
//! (spec.md §4 "Session Store", component C6).

pub mod health;
pub mod store;

pub use health::{derive_health, SessionHealthConfig};
pub use store::FileSessionStore;
