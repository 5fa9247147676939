//! Port traits implemented by `fathom-adapters`, `fathom-vector` and
//! `fathom-session`.
//!
//! Grounded on two teacher shapes: `riptide_types::ports::CacheStorage`'s
//! backend-agnostic async trait (generalized here to vectors and sessions so
//! `fathom-fetcher`/`fathom-facade` depend only on `fathom-types`, never on a
//! concrete backend crate) and `riptide_browser_abstraction::traits`'s
//! `BrowserEngine`/`PageHandle` pair (collapsed to one `RenderAdapter` per
//! tier since each Fathom tier, unlike a browser engine, produces a finished
//! `BrowseResult` rather than a steerable page handle).

use crate::error::Result;
use crate::request::BrowseRequest;
use crate::result::BrowseResult;
use async_trait::async_trait;

/// One render tier's fetch+extract implementation.
///
/// `fathom-adapters` implements this for the intelligence and lightweight
/// tiers; the playwright tier is implemented by a collaborator outside this
/// workspace (spec.md §1 names it out of scope) but must satisfy this same
/// trait to plug into `fathom-fetcher`'s cascade.
#[async_trait]
pub trait RenderAdapter: Send + Sync {
    /// Run this tier against `request`, returning a fully populated result
    /// or an error classified via [`crate::error::FailureReason`].
    async fn fetch(&self, request: &BrowseRequest) -> Result<BrowseResult>;

    /// Human-readable adapter name for logging, e.g. `"intelligence"`.
    fn name(&self) -> &'static str;
}

/// A single stored embedding plus its source metadata.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
}

/// A scored match returned from a similarity search.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
    /// Only populated when the search was run with `include_vector: true`.
    pub vector: Option<Vec<f32>>,
}

/// `search`/`search_filtered` options (spec.md §4.5): `limit` truncates by
/// rank, `min_score` then filters the truncated set (filtering happens
/// after the top-k cut, not before), `include_vector` opts into echoing the
/// full embedding back on each match.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    pub min_score: Option<f32>,
    pub include_vector: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: 10, min_score: None, include_vector: false }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct VectorStats {
    pub count: usize,
    pub dimensions: usize,
}

/// Backend-agnostic vector storage, generalized from `CacheStorage`'s
/// byte-oriented `get`/`set` to embedding-oriented `add`/`search` (spec.md
/// §4.3). Implementations must be `Send + Sync` and safe to share behind an
/// `Arc`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add(&self, record: VectorRecord) -> Result<()>;

    async fn add_batch(&self, records: Vec<VectorRecord>) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Delete every record whose metadata matches every key/value in `filter`.
    /// Returns the number of records removed.
    async fn delete_by_filter(
        &self,
        filter: &std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<usize>;

    async fn search(&self, query: &[f32], options: &SearchOptions) -> Result<Vec<VectorMatch>>;

    /// Like [`VectorStore::search`] but restricted to records matching every
    /// key/value in `filter`.
    async fn search_filtered(
        &self,
        query: &[f32],
        options: &SearchOptions,
        filter: &std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<Vec<VectorMatch>>;

    async fn get(&self, id: &str) -> Result<Option<VectorRecord>>;

    async fn stats(&self) -> Result<VectorStats>;
}

/// A saved browser session (cookies, storage, fingerprint) for one
/// (domain, profile) pair, opaque to everyone but the adapter that wrote it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    pub domain: String,
    pub profile: String,
    pub payload: Vec<u8>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Session health as derived by `fathom-session` (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionHealth {
    Healthy,
    ExpiringSoon,
    Expired,
    Stale,
    Missing,
}

/// Session persistence port implemented by `fathom-session`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, snapshot: SessionSnapshot) -> Result<()>;

    async fn load(&self, domain: &str, profile: &str) -> Result<Option<SessionSnapshot>>;

    async fn health(&self, domain: &str, profile: &str) -> Result<SessionHealth>;

    async fn invalidate(&self, domain: &str, profile: &str) -> Result<()>;
}
