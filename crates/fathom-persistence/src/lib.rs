//! C3: debounced, atomic-write persistence for any JSON-serialisable state.

mod store;

pub use store::PersistedStore;
