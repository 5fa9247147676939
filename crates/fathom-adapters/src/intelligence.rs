//! Intelligence-tier adapter (spec.md §4.4 "Intelligence adapter"): pattern
//! lookup in C4, direct HTTP GET of the derived endpoint, JSON→content
//! mapping. No fallback inside this adapter — mapping failure escalates.

use async_trait::async_trait;
use fathom_patterns::{validate, PatternRegistry};
use fathom_types::{
    BrowseMetadata, BrowseRequest, BrowseResult, DiscoveredApi, ExtractedContent, FathomError,
    LearningInfo, RenderAdapter, Result, Tier,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

pub struct IntelligenceAdapter {
    client: reqwest::Client,
    registry: Arc<PatternRegistry>,
}

impl IntelligenceAdapter {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { client: reqwest::Client::new(), registry }
    }
}

#[async_trait]
impl RenderAdapter for IntelligenceAdapter {
    fn name(&self) -> &'static str {
        "intelligence"
    }

    async fn fetch(&self, request: &BrowseRequest) -> Result<BrowseResult> {
        let started = Instant::now();
        let url = Url::parse(&request.url)?;

        let pattern = self
            .registry
            .match_for_url(&url)
            .into_iter()
            .next()
            .ok_or_else(|| FathomError::Internal("selector: no api pattern match for host".to_string()))?;

        let endpoint = pattern.build_endpoint(&url).ok_or_else(|| {
            FathomError::Internal("selector: pattern extractors did not resolve against url".to_string())
        })?;

        debug!(endpoint = %endpoint, pattern_id = %pattern.id, "intelligence tier fetching derived endpoint");

        let response = self.client.get(&endpoint).send().await.map_err(classify_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }
        let body = response.text().await.map_err(classify_reqwest_error)?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        let fields = pattern.content_mapping.apply(&json);

        let validation = validate(&pattern.required_fields, &fields, body.len(), pattern.min_content_length);
        if !validation.passed {
            return Err(FathomError::Internal(format!(
                "validation failed: missing {:?}",
                validation.missing_fields
            )));
        }

        let body_text = field_as_text(fields.get("body")).unwrap_or_else(|| body.clone());

        Ok(BrowseResult {
            url: request.url.clone(),
            final_url: endpoint.clone(),
            title: fields.get("title").and_then(|v| v.as_str()).map(str::to_string),
            content: ExtractedContent { markdown: body_text.clone(), text: body_text, html: None },
            tables: Vec::new(),
            discovered_apis: vec![DiscoveredApi {
                endpoint,
                pattern_id: Some(pattern.id.clone()),
                can_bypass_browser: true,
            }],
            metadata: BrowseMetadata {
                load_time_ms: started.elapsed().as_millis() as u64,
                tier_used: Tier::Intelligence,
                tiers_attempted: vec![Tier::Intelligence],
                cached: false,
            },
            learning: LearningInfo {
                confidence: pattern.confidence,
                validation,
                content_changed: None,
                selectors_applied: Vec::new(),
            },
            verification: None,
            structured: fields,
        })
    }
}

/// A mapped `body`/`description` field as display text: strings pass through,
/// anything else (object, array, number) falls back to its JSON rendering.
fn field_as_text(value: Option<&serde_json::Value>) -> Option<String> {
    value.map(|v| match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    })
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_as_text_passes_strings_through_unquoted() {
        assert_eq!(field_as_text(Some(&json!("hello"))).as_deref(), Some("hello"));
    }

    #[test]
    fn field_as_text_renders_non_strings_as_json() {
        assert_eq!(field_as_text(Some(&json!({"a": 1}))).as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn missing_pattern_surfaces_a_selector_class_error() {
        let registry = Arc::new(PatternRegistry::new());
        let adapter = IntelligenceAdapter::new(registry);
        let request = BrowseRequest::new("https://totally-unknown-host.example/x");
        let err = adapter.fetch(&request).await.unwrap_err();
        assert!(err.to_string().contains("selector"));
    }
}
