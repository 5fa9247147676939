//! Text + markdown extraction (spec.md §4 Content Extractor).
//!
//! Grounded on `riptide-extraction::native_parser::extractors::content`:
//! try article-shaped selectors first, then a generic main-content area,
//! then the whole body, and build markdown from headings/paragraphs/lists
//! directly rather than re-parsing the collected text.

use fathom_types::ExtractedContent;
use scraper::{ElementRef, Html, Selector};

const ARTICLE_SELECTORS: &[&str] = &[
    "article",
    "[role='article']",
    ".article-content",
    ".post-content",
    ".entry-content",
    "main article",
];

const MAIN_SELECTORS: &[&str] = &["main", "[role='main']", ".main-content", "#content"];

const MIN_CONTENT_LEN: usize = 100;

pub fn extract_content(document: &Html) -> ExtractedContent {
    let scope = find_scope(document, ARTICLE_SELECTORS)
        .or_else(|| find_scope(document, MAIN_SELECTORS))
        .or_else(|| Selector::parse("body").ok().and_then(|s| document.select(&s).next()));

    let Some(root) = scope else {
        return ExtractedContent::default();
    };

    ExtractedContent {
        text: extract_text(root),
        markdown: extract_markdown(root),
        html: Some(root.html()),
    }
}

fn find_scope<'a>(document: &'a Html, selectors: &[&str]) -> Option<scraper::ElementRef<'a>> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = plain_text(element);
            if text.len() >= MIN_CONTENT_LEN {
                return Some(element);
            }
        }
    }
    None
}

fn plain_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

const BLOCK_SELECTORS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote"];

fn extract_text(root: ElementRef) -> String {
    let mut lines = Vec::new();
    for selector_str in BLOCK_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in root.select(&selector) {
            let text = plain_text(element);
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }
    lines.join("\n")
}

fn extract_markdown(root: ElementRef) -> String {
    let mut markdown = String::new();

    for level in 1..=6u8 {
        let selector_str = format!("h{level}");
        let Ok(selector) = Selector::parse(&selector_str) else {
            continue;
        };
        for heading in root.select(&selector) {
            let text = plain_text(heading);
            if !text.is_empty() {
                markdown.push_str(&"#".repeat(level as usize));
                markdown.push(' ');
                markdown.push_str(&text);
                markdown.push_str("\n\n");
            }
        }
    }

    if let Ok(p_selector) = Selector::parse("p") {
        for p in root.select(&p_selector) {
            let text = plain_text(p);
            if !text.is_empty() {
                markdown.push_str(&text);
                markdown.push_str("\n\n");
            }
        }
    }

    if let Ok(li_selector) = Selector::parse("li") {
        for li in root.select(&li_selector) {
            let text = plain_text(li);
            if !text.is_empty() {
                markdown.push_str("- ");
                markdown.push_str(&text);
                markdown.push('\n');
            }
        }
    }

    markdown.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_article_scope_over_body() {
        let html = r#"<html><body>
            <div>irrelevant preamble text that should not be picked up at all</div>
            <article><p>The actual article body, long enough to clear the minimum content length threshold for scope selection.</p></article>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let content = extract_content(&doc);
        assert!(content.text.contains("actual article body"));
    }

    #[test]
    fn markdown_includes_headings_and_paragraphs() {
        let html = "<html><body><article><h2>Section</h2><p>Some body text that is long enough to pass the minimum content length check applied to candidate scopes here.</p></article></body></html>";
        let doc = Html::parse_document(html);
        let content = extract_content(&doc);
        assert!(content.markdown.contains("## Section"));
        assert!(content.markdown.contains("Some body text"));
    }

    #[test]
    fn falls_back_to_body_when_no_article_or_main() {
        let html = "<html><body><p>Only a body paragraph here, long enough on its own to pass the minimum content length threshold check.</p></body></html>";
        let doc = Html::parse_document(html);
        let content = extract_content(&doc);
        assert!(content.text.contains("Only a body paragraph"));
    }
}
