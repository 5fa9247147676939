//! The five built-in pattern templates (spec.md §4.2). A template only names
//! an endpoint *shape*; the regex/extractors that do the actual matching
//! live on the [`crate::pattern::LearnedApiPattern`] instance.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternTemplate {
    /// `{url}.json`
    JsonSuffix,
    /// Cross-origin API, e.g. `https://registry.x.org/{package}`.
    RegistryLookup,
    /// Versioned same-origin or `api.` subdomain, `{owner}/{repo}/...`.
    RestResource,
    /// `.../{id}.json` keyed on a query or path id.
    FirebaseRest,
    /// `?...&id={id}` or `/api/.../{slug}`.
    QueryApi,
}

impl PatternTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            PatternTemplate::JsonSuffix => "json-suffix",
            PatternTemplate::RegistryLookup => "registry-lookup",
            PatternTemplate::RestResource => "rest-resource",
            PatternTemplate::FirebaseRest => "firebase-rest",
            PatternTemplate::QueryApi => "query-api",
        }
    }

    /// Infer a template from URL/endpoint structural comparison, as the
    /// Learning Engine does when a host has no existing pattern (spec.md
    /// §4.2 "Learning a new pattern"). `host_changed` is true when the
    /// derived API endpoint lives on a different host than the source URL.
    pub fn infer(source_url: &str, endpoint: &str, host_changed: bool) -> Self {
        if host_changed {
            return PatternTemplate::RegistryLookup;
        }
        if endpoint.ends_with(".json") {
            return PatternTemplate::JsonSuffix;
        }
        if endpoint.contains('?') {
            return PatternTemplate::QueryApi;
        }
        if endpoint.contains("api.") || endpoint.contains("/api/") {
            return PatternTemplate::RestResource;
        }
        let _ = source_url;
        PatternTemplate::QueryApi
    }
}

impl fmt::Display for PatternTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_json_suffix() {
        let t = PatternTemplate::infer("https://a.com/x", "https://a.com/x.json", false);
        assert_eq!(t, PatternTemplate::JsonSuffix);
    }

    #[test]
    fn infers_registry_lookup_on_host_change() {
        let t = PatternTemplate::infer("https://a.com/x", "https://registry.a.com/x", true);
        assert_eq!(t, PatternTemplate::RegistryLookup);
    }

    #[test]
    fn infers_query_api_by_default() {
        let t = PatternTemplate::infer("https://a.com/x", "https://a.com/data?id=5", false);
        assert_eq!(t, PatternTemplate::QueryApi);
    }

    #[test]
    fn infers_rest_resource_from_api_subdomain() {
        let t = PatternTemplate::infer("https://a.com/x", "https://api.a.com/x", false);
        assert_eq!(t, PatternTemplate::RestResource);
    }
}
