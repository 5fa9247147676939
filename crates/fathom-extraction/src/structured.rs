//! Structured data extraction: `application/ld+json` blocks merged with
//! Open Graph meta tags, into the `structured` map spec.md §3.1 attaches to
//! `BrowseResult`.

use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;

pub fn extract_structured(document: &Html) -> HashMap<String, Value> {
    let mut out = HashMap::new();

    if let Some(ld_json) = extract_json_ld(document) {
        out.insert("jsonLd".to_string(), ld_json);
    }

    let og = extract_open_graph(document);
    if !og.is_empty() {
        out.insert("openGraph".to_string(), Value::Object(og.into_iter().collect()));
    }

    out
}

fn extract_json_ld(document: &Html) -> Option<Value> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    let blocks: Vec<Value> = document
        .select(&selector)
        .filter_map(|el| {
            let text: String = el.text().collect();
            serde_json::from_str::<Value>(text.trim()).ok()
        })
        .collect();

    match blocks.len() {
        0 => None,
        1 => blocks.into_iter().next(),
        _ => Some(Value::Array(blocks)),
    }
}

fn extract_open_graph(document: &Html) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    let Ok(selector) = Selector::parse("meta[property^='og:']") else {
        return map;
    };
    for el in document.select(&selector) {
        let value = el.value();
        let (Some(property), Some(content)) = (value.attr("property"), value.attr("content"))
        else {
            continue;
        };
        let key = property.trim_start_matches("og:").to_string();
        map.insert(key, Value::String(content.to_string()));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_json_ld_block() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Article", "headline": "Hello"}</script>
        </head></html>"#;
        let doc = Html::parse_document(html);
        let structured = extract_structured(&doc);
        let ld = &structured["jsonLd"];
        assert_eq!(ld["headline"], "Hello");
    }

    #[test]
    fn extracts_open_graph_properties() {
        let html = r#"<html><head>
            <meta property="og:title" content="My Page">
            <meta property="og:type" content="website">
        </head></html>"#;
        let doc = Html::parse_document(html);
        let structured = extract_structured(&doc);
        let og = &structured["openGraph"];
        assert_eq!(og["title"], "My Page");
        assert_eq!(og["type"], "website");
    }

    #[test]
    fn empty_document_yields_no_keys() {
        let doc = Html::parse_document("<html><head></head><body></body></html>");
        assert!(extract_structured(&doc).is_empty());
    }
}
