//! Lightweight-tier adapter (spec.md §4.4 "Lightweight adapter"): HTTP GET
//! the original URL, run C1 (`fathom-extraction`) over the HTML. No JS
//! execution.

use async_trait::async_trait;
use fathom_types::{
    BrowseMetadata, BrowseRequest, BrowseResult, ExtractedContent, FathomError, LearningInfo,
    RenderAdapter, Result, Tier, ValidationOutcome,
};
use std::time::Instant;
use tracing::debug;

pub struct LightweightAdapter {
    client: reqwest::Client,
}

impl Default for LightweightAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LightweightAdapter {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

#[async_trait]
impl RenderAdapter for LightweightAdapter {
    fn name(&self) -> &'static str {
        "lightweight"
    }

    async fn fetch(&self, request: &BrowseRequest) -> Result<BrowseResult> {
        let started = Instant::now();

        let response = self.client.get(&request.url).send().await.map_err(classify_reqwest_error)?;
        let final_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }
        let html = response.text().await.map_err(classify_reqwest_error)?;

        debug!(url = %request.url, bytes = html.len(), "lightweight tier fetched and parsing html");
        let extraction = fathom_extraction::extract(&html);

        let content = ExtractedContent { html: Some(html), ..extraction.content };

        Ok(BrowseResult {
            url: request.url.clone(),
            final_url,
            title: extraction.title,
            content,
            tables: extraction.tables,
            discovered_apis: Vec::new(),
            metadata: BrowseMetadata {
                load_time_ms: started.elapsed().as_millis() as u64,
                tier_used: Tier::Lightweight,
                tiers_attempted: vec![Tier::Lightweight],
                cached: false,
            },
            learning: LearningInfo {
                confidence: 1.0,
                validation: ValidationOutcome { passed: true, missing_fields: Vec::new(), reason: None },
                content_changed: None,
                selectors_applied: Vec::new(),
            },
            verification: None,
            structured: extraction.structured,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> FathomError {
    if e.is_timeout() {
        FathomError::Internal(format!("timeout: {e}"))
    } else if e.is_connect() {
        FathomError::Internal(format!("network: {e}"))
    } else {
        FathomError::Internal(format!("unknown: {e}"))
    }
}

fn classify_status(status: u16) -> FathomError {
    match status {
        401 | 403 => FathomError::Internal(format!("auth: http status {status}")),
        429 => FathomError::Internal(format!("rate limit: http status {status}")),
        _ => FathomError::Internal(format!("unknown: http status {status}")),
    }
}
