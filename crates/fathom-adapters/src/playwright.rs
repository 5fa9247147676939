//! Playwright-tier adapter stub.
//!
//! The concrete browser engine is a collaborator interface out of scope for
//! this system (spec.md §1: "concrete browser automation engine — treated
//! as an adapter behind a three-method interface"). This type exists so the
//! tier cascade in `fathom-fetcher` can be wired against the real
//! `RenderAdapter` contract end to end; a deployment swaps it for a type
//! that drives an actual browser (honoring `wait_hints`, `session_profile`
//! injection from `fathom-session`, network/console capture) behind the
//! same trait.

use async_trait::async_trait;
use fathom_types::{BrowseRequest, BrowseResult, FathomError, RenderAdapter, Result};

#[derive(Default)]
pub struct PlaywrightAdapter;

#[async_trait]
impl RenderAdapter for PlaywrightAdapter {
    fn name(&self) -> &'static str {
        "playwright"
    }

    async fn fetch(&self, _request: &BrowseRequest) -> Result<BrowseResult> {
        Err(FathomError::Internal(
            "playwright adapter not wired: concrete browser engine is a collaborator interface"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_always_errors() {
        let adapter = PlaywrightAdapter;
        let request = BrowseRequest::new("https://example.com");
        assert!(adapter.fetch(&request).await.is_err());
    }
}
