//! `VariableExtractor`: pulls one named variable (`{owner}`, `{repo}`, `{id}`,
//! ...) out of a source URL (spec.md §3.2).

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractorSource {
    /// Match against the full path (`/owner/repo/issues/3`).
    Path,
    /// Match against one query parameter's value.
    Query,
    /// Match against the first label of the hostname.
    Subdomain,
    /// Match against the full hostname.
    Hostname,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    Lowercase,
    Uppercase,
    UrlEncode,
    UrlDecode,
}

impl Transform {
    fn apply(&self, value: &str) -> String {
        match self {
            Transform::Lowercase => value.to_lowercase(),
            Transform::Uppercase => value.to_uppercase(),
            Transform::UrlEncode => url::form_urlencoded::byte_serialize(value.as_bytes()).collect(),
            Transform::UrlDecode => url::form_urlencoded::parse(value.as_bytes())
                .map(|(k, _)| k.into_owned())
                .next()
                .unwrap_or_else(|| value.to_string()),
        }
    }
}

/// Defines how to pull one `{name}` variable out of a source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableExtractor {
    pub name: String,
    pub source: ExtractorSource,
    /// Name of the query parameter to read, when `source == Query`.
    pub query_key: Option<String>,
    /// Regex applied to the source string; `group` selects the capture group.
    pub pattern: String,
    pub group: usize,
    pub transform: Option<Transform>,
}

impl VariableExtractor {
    pub fn apply(&self, url: &Url) -> Option<String> {
        let base = match self.source {
            ExtractorSource::Path => url.path().to_string(),
            ExtractorSource::Query => {
                let key = self.query_key.as_deref()?;
                url.query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())?
            }
            ExtractorSource::Subdomain => url.host_str()?.split('.').next()?.to_string(),
            ExtractorSource::Hostname => url.host_str()?.to_string(),
        };

        let regex = Regex::new(&self.pattern).ok()?;
        let captures = regex.captures(&base)?;
        let raw = captures.get(self.group)?.as_str().to_string();

        Some(match &self.transform {
            Some(t) => t.apply(&raw),
            None => raw,
        })
    }
}
