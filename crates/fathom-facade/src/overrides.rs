//! Per-URL overrides merged onto a `batchBrowse` call's common request
//! template (spec.md §6.1 `BatchOverrides`).

use fathom_types::{Budget, BrowseRequest, Verify};
use serde::Deserialize;

/// The subset of `BrowseRequest` fields a caller may override per URL.
/// Anything absent from the JSON value is left untouched on the common
/// template.
#[derive(Debug, Default, Deserialize)]
struct BrowseOverride {
    #[serde(default)]
    content_type_hint: Option<String>,
    #[serde(default)]
    wait_hints: Option<Vec<String>>,
    #[serde(default)]
    session_profile: Option<String>,
    #[serde(default)]
    budget: Option<Budget>,
    #[serde(default)]
    verify: Option<Verify>,
}

/// Clone `common`, set its URL to `url`, and apply whichever fields `raw`
/// specifies. An override that fails to parse is ignored — the common
/// template wins rather than failing the whole batch item over one bad
/// override.
pub fn apply(common: &BrowseRequest, url: &str, raw: Option<&serde_json::Value>) -> BrowseRequest {
    let mut request = common.clone();
    request.url = url.to_string();

    let Some(value) = raw else { return request };
    let Ok(over) = serde_json::from_value::<BrowseOverride>(value.clone()) else {
        return request;
    };

    if let Some(hint) = over.content_type_hint {
        request.content_type_hint = Some(hint);
    }
    if let Some(wait_hints) = over.wait_hints {
        request.wait_hints = wait_hints;
    }
    if let Some(profile) = over.session_profile {
        request.session_profile = Some(profile);
    }
    if let Some(budget) = over.budget {
        request.budget = budget;
    }
    if let Some(verify) = over.verify {
        request.verify = Some(verify);
    }
    request
}
