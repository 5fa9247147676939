//! Title extraction, priority-ordered (spec.md §4 Content Extractor).
//!
//! Grounded on `riptide-extraction::native_parser::extractors::title`:
//! Open Graph, then Twitter Card, then `<title>`, then `<h1>` as a last
//! resort, each skipped if empty or implausibly long.

use scraper::{Html, Selector};

pub fn extract_title(document: &Html) -> Option<String> {
    extract_og_title(document)
        .or_else(|| extract_twitter_title(document))
        .or_else(|| extract_html_title(document))
        .or_else(|| extract_h1_title(document))
}

fn extract_og_title(document: &Html) -> Option<String> {
    meta_content(document, "meta[property='og:title']")
}

fn extract_twitter_title(document: &Html) -> Option<String> {
    meta_content(document, "meta[name='twitter:title']")
}

fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("content")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_html_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let cleaned = text.trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn extract_h1_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let cleaned = text.trim().to_string();
    (!cleaned.is_empty() && cleaned.len() <= 200).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_og_title_over_html_title() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Page Title</title>
        </head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_title(&doc), Some("OG Title".to_string()));
    }

    #[test]
    fn falls_back_to_h1_when_no_meta_or_title() {
        let html = "<html><body><h1>Heading Title</h1></body></html>";
        let doc = Html::parse_document(html);
        assert_eq!(extract_title(&doc), Some("Heading Title".to_string()));
    }

    #[test]
    fn returns_none_when_nothing_found() {
        let doc = Html::parse_document("<html><body><p>no title here</p></body></html>");
        assert_eq!(extract_title(&doc), None);
    }
}
