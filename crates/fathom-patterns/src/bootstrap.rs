//! Built-in seed patterns for a small number of well-known sites, applied
//! once when the registry is first initialised empty (spec.md §4.2
//! "Bootstrap").

use crate::extractor::{ExtractorSource, VariableExtractor};
use crate::mapping::{ContentMapping, ContentPath};
use crate::pattern::{LearnedApiPattern, PatternSource};
use crate::template::PatternTemplate;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Seed patterns at `confidence=1.0, success_count=1000` per spec.md §4.2;
/// this is a normal learning event with `source=bootstrap`, not a special
/// case the fetcher treats differently.
pub fn seed_patterns() -> Vec<LearnedApiPattern> {
    vec![github_repo_pattern(), reddit_json_pattern(), npm_registry_pattern()]
}

fn bootstrap_pattern(
    host: &str,
    template: PatternTemplate,
    url_pattern: &str,
    endpoint_template: &str,
    extractors: Vec<VariableExtractor>,
    content_mapping: ContentMapping,
) -> LearnedApiPattern {
    LearnedApiPattern {
        id: Uuid::new_v4().to_string(),
        host: host.to_string(),
        template,
        url_pattern: url_pattern.to_string(),
        endpoint_template: endpoint_template.to_string(),
        extractors,
        required_fields: vec!["title".to_string()],
        content_mapping,
        min_content_length: 20,
        success_count: 1000,
        failure_count: 0,
        avg_response_time_ms: 250.0,
        confidence: 1.0,
        coverage: HashSet::from([host.to_string()]),
        last_success: Some(Utc::now()),
        last_failure_reason: None,
        source: PatternSource::Bootstrap,
        created_at: Utc::now(),
    }
}

fn github_repo_pattern() -> LearnedApiPattern {
    bootstrap_pattern(
        "github.com",
        PatternTemplate::RegistryLookup,
        r"^https?://github\.com/[^/]+/[^/]+/?$",
        "https://api.github.com/repos/{owner}/{repo}",
        vec![
            VariableExtractor {
                name: "owner".into(),
                source: ExtractorSource::Path,
                query_key: None,
                pattern: r"^/([^/]+)/([^/]+)".into(),
                group: 1,
                transform: None,
            },
            VariableExtractor {
                name: "repo".into(),
                source: ExtractorSource::Path,
                query_key: None,
                pattern: r"^/([^/]+)/([^/]+)".into(),
                group: 2,
                transform: None,
            },
        ],
        ContentMapping {
            title: ContentPath::parse("full_name"),
            description: Some(ContentPath::parse("description")),
            body: None,
            metadata: None,
        },
    )
}

fn reddit_json_pattern() -> LearnedApiPattern {
    bootstrap_pattern(
        "reddit.com",
        PatternTemplate::JsonSuffix,
        r"^https?://(?:www\.)?reddit\.com/r/[^/]+/comments/[^/]+/?.*$",
        "{url}",
        Vec::new(),
        ContentMapping {
            title: ContentPath::parse("data.children[0].data.title"),
            description: None,
            body: Some(ContentPath::parse("data.children[0].data.selftext")),
            metadata: None,
        },
    )
}

fn npm_registry_pattern() -> LearnedApiPattern {
    bootstrap_pattern(
        "npmjs.com",
        PatternTemplate::RegistryLookup,
        r"^https?://(?:www\.)?npmjs\.com/package/[^/]+/?$",
        "https://registry.npmjs.org/{package}",
        vec![VariableExtractor {
            name: "package".into(),
            source: ExtractorSource::Path,
            query_key: None,
            pattern: r"^/package/([^/]+)".into(),
            group: 1,
            transform: None,
        }],
        ContentMapping {
            title: ContentPath::parse("name"),
            description: Some(ContentPath::parse("description")),
            body: None,
            metadata: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_patterns_have_full_confidence_and_bootstrap_source() {
        for pattern in seed_patterns() {
            assert_eq!(pattern.confidence, 1.0);
            assert_eq!(pattern.success_count, 1000);
            assert_eq!(pattern.source, PatternSource::Bootstrap);
        }
    }

    #[test]
    fn github_pattern_matches_repo_urls() {
        let pattern = github_repo_pattern();
        let url = url::Url::parse("https://github.com/rust-lang/rust").unwrap();
        assert!(pattern.matches_url(&url));
        assert_eq!(
            pattern.build_endpoint(&url).as_deref(),
            Some("https://api.github.com/repos/rust-lang/rust")
        );
    }

    #[test]
    fn reddit_mapping_resolves_title_out_of_the_listing_envelope() {
        let pattern = reddit_json_pattern();
        let listing = serde_json::json!({
            "data": {"children": [{"data": {"title": "first post", "selftext": "body text"}}]}
        });
        let fields = pattern.content_mapping.apply(&listing);
        assert_eq!(fields.get("title").unwrap(), "first post");
        assert_eq!(fields.get("body").unwrap(), "body text");
        assert!(pattern.required_fields.iter().all(|f| fields.contains_key(f)));
    }
}
