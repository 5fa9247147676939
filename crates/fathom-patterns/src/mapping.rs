//! Content Mapping (spec.md §4.7, Glossary "Content Mapping"): JSON-path
//! expressions that turn an Intelligence-tier response into
//! `{title, description?, body?, metadata?}`.
//!
//! The path language (spec.md §9 "Dynamic field paths") is dot-plus-bracket,
//! e.g. `data.children[0].data.title`. [`ContentPath`] parses one into a
//! sequence of [`PathSegment`]s and walks a generic `serde_json::Value` with
//! them; there is no expression evaluation beyond key/index lookup.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn step<'a>(&self, value: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        match self {
            PathSegment::Key(key) => value.get(key),
            PathSegment::Index(index) => value.get(index),
        }
    }
}

/// A parsed dot-plus-bracket path, e.g. `items[0].title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath(Vec<PathSegment>);

impl ContentPath {
    pub fn parse(expr: &str) -> Self {
        let mut segments = Vec::new();
        for part in expr.split('.').filter(|p| !p.is_empty()) {
            let mut rest = part;
            match rest.find('[') {
                None => segments.push(PathSegment::Key(rest.to_string())),
                Some(bracket) => {
                    if bracket > 0 {
                        segments.push(PathSegment::Key(rest[..bracket].to_string()));
                    }
                    rest = &rest[bracket..];
                    while let Some(stripped) = rest.strip_prefix('[') {
                        let Some(close) = stripped.find(']') else { break };
                        if let Ok(index) = stripped[..close].parse::<usize>() {
                            segments.push(PathSegment::Index(index));
                        }
                        rest = &stripped[close + 1..];
                    }
                }
            }
        }
        Self(segments)
    }

    /// Walk `value` one segment at a time; any missing key or out-of-range
    /// index yields `None` rather than an error, per spec.md §9 treating an
    /// unresolved path as an absent field, not a fetch failure.
    pub fn resolve<'a>(&self, value: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        self.0.iter().try_fold(value, |current, segment| segment.step(current))
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if index > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for ContentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(D::Error::custom("content path must not be empty"));
        }
        Ok(ContentPath::parse(&raw))
    }
}

/// Per-pattern JSON-path expressions producing the Intelligence tier's
/// output fields (spec.md §4.1/§4.7). `title` is the only required path;
/// an unresolved `title` leaves the field absent rather than defaulting,
/// so the usual required-fields validation catches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMapping {
    pub title: ContentPath,
    pub description: Option<ContentPath>,
    pub body: Option<ContentPath>,
    pub metadata: Option<ContentPath>,
}

impl ContentMapping {
    /// A mapping that reads `title` straight off the top-level object —
    /// the shape a freshly inferred pattern starts with before anything
    /// narrower is known.
    pub fn flat(title_field: &str) -> Self {
        Self {
            title: ContentPath::parse(title_field),
            description: None,
            body: None,
            metadata: None,
        }
    }

    /// Resolve every configured path against `value`, producing the
    /// `{title, description?, body?, metadata?}` field map (spec.md §4.7).
    pub fn apply(&self, value: &serde_json::Value) -> HashMap<String, serde_json::Value> {
        let mut fields = HashMap::new();
        if let Some(title) = self.title.resolve(value) {
            fields.insert("title".to_string(), title.clone());
        }
        for (name, path) in [
            ("description", &self.description),
            ("body", &self.body),
            ("metadata", &self.metadata),
        ] {
            if let Some(path) = path {
                if let Some(resolved) = path.resolve(value) {
                    fields.insert(name.to_string(), resolved.clone());
                }
            }
        }
        fields
    }
}

impl Default for ContentMapping {
    fn default() -> Self {
        Self::flat("title")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_key_resolves_top_level_field() {
        let path = ContentPath::parse("title");
        let value = json!({"title": "hello"});
        assert_eq!(path.resolve(&value), Some(&json!("hello")));
    }

    #[test]
    fn dotted_bracket_path_walks_nested_array_and_object() {
        let path = ContentPath::parse("data.children[0].data.title");
        let value = json!({"data": {"children": [{"data": {"title": "first post"}}]}});
        assert_eq!(path.resolve(&value), Some(&json!("first post")));
    }

    #[test]
    fn missing_segment_resolves_to_none() {
        let path = ContentPath::parse("a.b[2].c");
        let value = json!({"a": {"b": [1]}});
        assert_eq!(path.resolve(&value), None);
    }

    #[test]
    fn path_roundtrips_through_display() {
        let path = ContentPath::parse("items[0].title");
        assert_eq!(path.to_string(), "items[0].title");
    }

    #[test]
    fn content_mapping_produces_only_resolved_fields() {
        let mapping = ContentMapping {
            title: ContentPath::parse("name"),
            description: Some(ContentPath::parse("description")),
            body: None,
            metadata: None,
        };
        let fields = mapping.apply(&json!({"name": "fathom", "description": "a crate"}));
        assert_eq!(fields.get("title").unwrap(), "fathom");
        assert_eq!(fields.get("description").unwrap(), "a crate");
        assert!(!fields.contains_key("body"));
    }

    #[test]
    fn unresolved_title_leaves_field_absent() {
        let mapping = ContentMapping::flat("missing");
        let fields = mapping.apply(&json!({"title": "hi"}));
        assert!(!fields.contains_key("title"));
    }
}
