//! The validation gate applied uniformly to a raw tier result (spec.md
//! §4.4): pattern field/length checks plus caller `Verify` hints, plus the
//! lightweight-tier SPA-shell escalation check from [`crate::sniff`].
//!
//! The Intelligence adapter validates internally and never reaches this gate
//! with a failing result (spec.md §4.4: "no fallback inside this adapter");
//! Lightweight and Playwright results are optimistic until checked here.

use crate::sniff::looks_like_spa_shell;
use fathom_patterns::{validate, LearnedApiPattern};
use fathom_types::{BrowseResult, Tier, ValidationOutcome, Verify, VerificationReport, VerifyMode};
use regex::Regex;

pub struct GateOutcome {
    pub validation: ValidationOutcome,
    pub verification: Option<VerificationReport>,
    pub should_escalate: bool,
}

impl GateOutcome {
    /// Whether the result may be returned to the caller as-is.
    pub fn passed(&self) -> bool {
        self.validation.passed
            && !self.should_escalate
            && self.verification.as_ref().map(|v| v.checks_failed.is_empty()).unwrap_or(true)
    }
}

pub fn run_validation_gate(
    result: &BrowseResult,
    pattern: Option<&LearnedApiPattern>,
    verify: Option<&Verify>,
) -> GateOutcome {
    let body_len = result.content.text.len().max(result.content.markdown.len());

    let validation = match pattern {
        Some(p) => validate(&p.required_fields, &result.structured, body_len, p.min_content_length),
        None => ValidationOutcome {
            passed: body_len > 0,
            missing_fields: Vec::new(),
            reason: if body_len == 0 { Some("empty content".to_string()) } else { None },
        },
    };

    let should_escalate = result.metadata.tier_used == Tier::Lightweight
        && result
            .content
            .html
            .as_deref()
            .map(looks_like_spa_shell)
            .unwrap_or(false);

    let verification = verify.map(|v| apply_verify(v, result));

    GateOutcome { validation, verification, should_escalate }
}

fn apply_verify(verify: &Verify, result: &BrowseResult) -> VerificationReport {
    let mode_applied = match verify.mode {
        VerifyMode::Basic => "basic",
        VerifyMode::Standard => "standard",
        VerifyMode::Thorough => "thorough",
    }
    .to_string();

    let haystack = if !result.content.text.is_empty() { &result.content.text } else { &result.content.markdown };

    let mut checks_passed = 0;
    let mut checks_failed = Vec::new();

    for needle in &verify.must_contain {
        if haystack.contains(needle.as_str()) {
            checks_passed += 1;
        } else {
            checks_failed.push(format!("must_contain: {needle}"));
        }
    }

    for pattern in &verify.must_match {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(haystack) => checks_passed += 1,
            _ => checks_failed.push(format!("must_match: {pattern}")),
        }
    }

    VerificationReport { mode_applied, checks_passed, checks_failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::{BrowseMetadata, ExtractedContent, LearningInfo};
    use std::collections::HashMap;

    fn sample(html: Option<&str>, text: &str) -> BrowseResult {
        BrowseResult {
            url: "https://example.com".into(),
            final_url: "https://example.com".into(),
            title: None,
            content: ExtractedContent { markdown: String::new(), text: text.to_string(), html: html.map(str::to_string) },
            tables: vec![],
            discovered_apis: vec![],
            metadata: BrowseMetadata {
                load_time_ms: 1,
                tier_used: Tier::Lightweight,
                tiers_attempted: vec![Tier::Lightweight],
                cached: false,
            },
            learning: LearningInfo {
                confidence: 1.0,
                validation: ValidationOutcome { passed: true, missing_fields: vec![], reason: None },
                content_changed: None,
                selectors_applied: vec![],
            },
            verification: None,
            structured: HashMap::new(),
        }
    }

    #[test]
    fn empty_body_without_pattern_fails_validation() {
        let result = sample(None, "");
        let outcome = run_validation_gate(&result, None, None);
        assert!(!outcome.validation.passed);
    }

    #[test]
    fn spa_shell_html_triggers_escalation() {
        let result = sample(Some(r#"<html><script>window.__NEXT_DATA__={}</script></html>"#), "some text");
        let outcome = run_validation_gate(&result, None, None);
        assert!(outcome.should_escalate);
        assert!(!outcome.passed());
    }

    #[test]
    fn must_contain_hint_is_checked() {
        let result = sample(None, "hello world");
        let verify = Verify { mode: VerifyMode::Standard, must_match: vec![], must_contain: vec!["world".into()] };
        let outcome = run_validation_gate(&result, None, Some(&verify));
        assert!(outcome.verification.unwrap().checks_failed.is_empty());
    }

    #[test]
    fn failing_must_contain_hint_fails_the_gate() {
        let result = sample(None, "hello world");
        let verify = Verify { mode: VerifyMode::Standard, must_match: vec![], must_contain: vec!["goodbye".into()] };
        let outcome = run_validation_gate(&result, None, Some(&verify));
        assert!(!outcome.passed());
    }
}
