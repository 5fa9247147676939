//! C1: pure HTML → `{title, text, markdown, tables, structured}` extraction.
//!
//! Every function here is a pure function of its HTML input; no IO, no
//! async, no shared state. `fathom-adapters` calls [`extract`] after
//! fetching a page; `fathom-fetcher` never calls into `scraper` directly.

mod content;
mod structured;
mod tables;
mod title;

use fathom_types::{ExtractedContent, ExtractedTable};
use scraper::Html;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Everything C1 produces from one HTML document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub title: Option<String>,
    pub content: ExtractedContent,
    pub tables: Vec<ExtractedTable>,
    pub structured: HashMap<String, Value>,
}

/// Run the full extraction pipeline over raw HTML.
pub fn extract(html: &str) -> Extraction {
    let document = Html::parse_document(html);

    let result = Extraction {
        title: title::extract_title(&document),
        content: content::extract_content(&document),
        tables: tables::extract_tables(&document),
        structured: structured::extract_structured(&document),
    };

    debug!(
        title = result.title.as_deref().unwrap_or(""),
        text_len = result.content.text.len(),
        table_count = result.tables.len(),
        "extracted content from document"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline_populates_every_field() {
        let html = r#"<html><head>
            <title>Example Article</title>
            <script type="application/ld+json">{"@type": "Article"}</script>
        </head><body>
            <article><h1>Example Article</h1>
            <p>Enough article text in the body to clear the minimum content length threshold used to pick this scope.</p>
            </article>
            <table><tr><th>A</th></tr><tr><td>1</td></tr></table>
        </body></html>"#;

        let result = extract(html);
        assert_eq!(result.title.as_deref(), Some("Example Article"));
        assert!(result.content.text.contains("Enough article text"));
        assert!(!result.content.markdown.is_empty());
        assert_eq!(result.tables.len(), 1);
        assert!(result.structured.contains_key("jsonLd"));
    }

    #[test]
    fn empty_html_produces_empty_extraction() {
        let result = extract("<html></html>");
        assert!(result.title.is_none());
        assert!(result.content.text.is_empty());
        assert!(result.tables.is_empty());
        assert!(result.structured.is_empty());
    }
}
