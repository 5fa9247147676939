//! Content-sniffing for the lightweight→playwright escalation decision
//! (spec.md §4.1: "a lightweight fetch that looks like an SPA shell escalates
//! even if nominally valid").
//!
//! Adapted from `riptide_reliability::engine_selection`'s content-ratio and
//! placeholder heuristics, generalized from an engine-choice decision to a
//! single bool: does this HTML look like an empty client-rendered shell.

const ANTI_SCRAPING_MARKERS: &[&str] = &[
    "cloudflare",
    "cf-browser-verification",
    "grecaptcha",
    "hcaptcha",
    "perimeterx",
];

const FRAMEWORK_MARKERS: &[&str] = &[
    "__next_data__",
    "_reactroot",
    "data-reactroot",
    "__webpack_require__",
    "v-app",
    "createapp(",
    "data-vue-app",
    "ng-app",
    "ng-version",
];

const SKELETON_MARKERS: &[&str] = &[
    "skeleton",
    "shimmer",
    "loading-skeleton",
    "placeholder-glow",
    "content-loader",
    "animated-background",
];

/// Text-between-tags over total length. Cheap, order-of-magnitude signal.
pub fn content_ratio(html: &str) -> f64 {
    let total_len = html.len() as f64;
    if total_len == 0.0 {
        return 0.0;
    }
    let text_content: String = html.split('<').filter_map(|s| s.split('>').nth(1)).collect();
    text_content.trim().len() as f64 / total_len
}

/// Skeleton/shimmer class names or an `aria-busy="true"` marker.
pub fn has_placeholders(html: &str) -> bool {
    let lower = html.to_lowercase();
    SKELETON_MARKERS.iter().any(|m| lower.contains(m)) || lower.contains("aria-busy=\"true\"")
}

fn has_framework_markers(lower: &str) -> bool {
    FRAMEWORK_MARKERS.iter().any(|m| lower.contains(m))
}

fn has_anti_scraping_markers(lower: &str) -> bool {
    ANTI_SCRAPING_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether a lightweight-tier result should be treated as an SPA shell and
/// escalated to Playwright rather than accepted as-is. Anti-scraping markers
/// and JS-framework markers escalate unconditionally; a bare low content
/// ratio escalates only together with placeholder markers, so a short but
/// genuine page (e.g. a redirect stub) isn't punished for brevity alone.
pub fn looks_like_spa_shell(html: &str) -> bool {
    let lower = html.to_lowercase();
    if has_anti_scraping_markers(&lower) || has_framework_markers(&lower) {
        return true;
    }
    content_ratio(html) < 0.1 && has_placeholders(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn react_shell_escalates() {
        let html = r#"<html><script>window.__NEXT_DATA__={}</script><body></body></html>"#;
        assert!(looks_like_spa_shell(html));
    }

    #[test]
    fn cloudflare_challenge_escalates() {
        let html = r#"<html><body>Checking your browser - cf-browser-verification</body></html>"#;
        assert!(looks_like_spa_shell(html));
    }

    #[test]
    fn sparse_but_real_page_does_not_escalate_without_placeholders() {
        let html = "<html><body><p>ok</p></body></html>";
        assert!(!looks_like_spa_shell(html));
    }

    #[test]
    fn sparse_page_with_skeleton_markers_escalates() {
        let html = r#"<html><body><div class="skeleton-box"></div></body></html>"#;
        assert!(looks_like_spa_shell(html));
    }

    #[test]
    fn content_heavy_article_does_not_escalate() {
        let html = "<html><body><article><p>a long paragraph of real article text goes here and keeps going for a while</p></article></body></html>";
        assert!(!looks_like_spa_shell(html));
    }
}
