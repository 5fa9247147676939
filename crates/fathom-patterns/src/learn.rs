//! Inferring a new `LearnedApiPattern` from one successful fetch (spec.md
//! §4.2 "Learning a new pattern"), run by the Learning Engine when a tier
//! succeeds at `lightweight`/`playwright` but the host has no pattern yet.

use crate::extractor::{ExtractorSource, VariableExtractor};
use crate::mapping::ContentMapping;
use crate::pattern::{LearnedApiPattern, PatternSource};
use crate::template::PatternTemplate;
use chrono::Utc;
use url::Url;
use uuid::Uuid;

const MIN_SEGMENT_LEN: usize = 3;

pub fn infer_pattern(source_url: &Url, endpoint: &str) -> Option<LearnedApiPattern> {
    let host = source_url.host_str()?.to_string();
    let endpoint_host = Url::parse(endpoint).ok().and_then(|u| u.host_str().map(str::to_string));
    let host_changed = endpoint_host.as_deref().is_some_and(|h| h != host);

    let template = PatternTemplate::infer(source_url.as_str(), endpoint, host_changed);

    let segments: Vec<&str> = source_url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let mut extractors = Vec::new();
    let mut endpoint_template = endpoint.to_string();

    for (index, segment) in segments.iter().enumerate() {
        if segment.len() < MIN_SEGMENT_LEN || !endpoint.contains(segment) {
            continue;
        }
        let name = format!("var{}", extractors.len() + 1);
        let pattern = positional_path_regex(index);
        extractors.push(VariableExtractor {
            name: name.clone(),
            source: ExtractorSource::Path,
            query_key: None,
            pattern,
            group: 1,
            transform: None,
        });
        endpoint_template = endpoint_template.replacen(segment, &format!("{{{name}}}"), 1);
    }

    let url_pattern = build_url_pattern(&host, segments.first().copied());

    Some(LearnedApiPattern {
        id: Uuid::new_v4().to_string(),
        host,
        template,
        url_pattern,
        endpoint_template,
        extractors,
        required_fields: Vec::new(),
        content_mapping: ContentMapping::default(),
        min_content_length: 0,
        success_count: 1,
        failure_count: 0,
        avg_response_time_ms: 0.0,
        confidence: 0.5,
        coverage: Default::default(),
        last_success: Some(Utc::now()),
        last_failure_reason: None,
        source: PatternSource::Learned,
        created_at: Utc::now(),
    })
}

/// A regex capturing the path segment at `index` (0-based), wherever it
/// falls among an arbitrary number of leading segments.
fn positional_path_regex(index: usize) -> String {
    format!("^(?:/[^/]+){{{index}}}/([^/]+)")
}

/// Hostname literal, first path segment literal, deeper segments wildcarded.
fn build_url_pattern(host: &str, first_segment: Option<&str>) -> String {
    let escaped_host = regex::escape(host);
    match first_segment {
        Some(seg) => format!(
            "^https?://{}/{}(?:/[^/]+)*/?$",
            escaped_host,
            regex::escape(seg)
        ),
        None => format!("^https?://{escaped_host}/?$"),
    }
}
