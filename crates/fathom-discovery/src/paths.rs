//! Bounded fixed list of `(path, method)` probe targets (spec.md §4.6). Kept
//! short and well-known on purpose — this is not a crawler, it's a handful
//! of single-shot probes per domain.

pub const PROBE_TARGETS: &[(&str, &str)] = &[
    ("/api", "HEAD"),
    ("/api/v1", "HEAD"),
    ("/api/v2", "HEAD"),
    ("/graphql", "HEAD"),
    ("/.well-known/openapi.json", "GET"),
    ("/openapi.json", "GET"),
    ("/swagger.json", "GET"),
    ("/api-docs", "GET"),
];
