//! Result validation (spec.md §4.4).

use fathom_types::ValidationOutcome;
use std::collections::HashMap;

/// A result is valid iff every required field resolves to a non-empty value
/// AND the body is at least `min_content_length` long.
pub fn validate(
    required_fields: &[String],
    fields: &HashMap<String, serde_json::Value>,
    body_len: usize,
    min_content_length: usize,
) -> ValidationOutcome {
    let missing_fields: Vec<String> = required_fields
        .iter()
        .filter(|name| !field_present(fields, name))
        .cloned()
        .collect();

    if !missing_fields.is_empty() {
        return ValidationOutcome {
            passed: false,
            missing_fields,
            reason: Some("missing required fields".to_string()),
        };
    }

    if body_len < min_content_length {
        return ValidationOutcome {
            passed: false,
            missing_fields: Vec::new(),
            reason: Some(format!(
                "body length {body_len} below minimum {min_content_length}"
            )),
        };
    }

    ValidationOutcome {
        passed: true,
        missing_fields: Vec::new(),
        reason: None,
    }
}

fn field_present(fields: &HashMap<String, serde_json::Value>, name: &str) -> bool {
    match fields.get(name) {
        None => false,
        Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}
