//! Shared types for Fathom: requests, results, errors, tiers, config and the
//! port traits every other `fathom-*` crate builds against.
//!
//! This crate has no dependency on any other `fathom-*` crate; it sits at the
//! bottom of the workspace's dependency graph so that adapters, storage
//! backends and the façade can all depend on it without cycles.

pub mod config;
pub mod error;
pub mod events;
pub mod hints;
pub mod ports;
pub mod request;
pub mod result;
pub mod tier;

pub use config::{
    DiscoveryConfig, FathomConfig, FetcherConfig, PredictorConfig, RegistryConfig, VectorConfig,
};
pub use error::{FailureReason, FathomError, Result};
pub use events::LearningEvent;
pub use hints::DomainHintMap;
pub use ports::{
    RenderAdapter, SearchOptions, SessionHealth, SessionSnapshot, SessionStore, VectorMatch,
    VectorRecord, VectorStats, VectorStore,
};
pub use request::{BatchOptions, BatchOverrides, Budget, BrowseRequest, Freshness, Verify, VerifyMode};
pub use result::{
    BrowseMetadata, BrowseResult, DiscoveredApi, ExtractedContent, ExtractedTable, LearningInfo,
    ValidationOutcome, VerificationReport,
};
pub use tier::Tier;
