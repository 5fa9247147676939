//! Result formatting, grounded on `riptide-cli::output::json`'s
//! serialize-or-summarize split: JSON mode dumps the value as-is, text mode
//! prints a short human summary instead of the full structure.

use fathom_facade::{BatchBrowseReport, DomainIntelligence, LearningStats};
use fathom_types::{BrowseResult, Result};

pub fn browse_result(result: &Result<BrowseResult>, json: bool) {
    if json {
        match result {
            Ok(r) => println!("{}", serde_json::to_string_pretty(r).unwrap()),
            Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
        }
        return;
    }

    match result {
        Ok(r) => {
            println!("tier: {:?}", r.metadata.tier_used);
            println!("load_time_ms: {}", r.metadata.load_time_ms);
            println!("title: {}", r.title.as_deref().unwrap_or("(none)"));
        }
        Err(e) => println!("error: {e}"),
    }
}

pub fn batch_report(report: &BatchBrowseReport, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(report).unwrap());
        return;
    }

    println!(
        "{} succeeded, {} failed, {} ms total",
        report.success_count, report.failure_count, report.total_time_ms
    );
    for item in &report.results {
        match &item.result {
            Ok(_) => println!("  ok    {}", item.url),
            Err(e) => println!("  error {} ({e})", item.url),
        }
    }
}

pub fn domain_intelligence(info: &DomainIntelligence, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(info).unwrap());
        return;
    }

    println!("domain: {}", info.domain);
    println!("known patterns: {}", info.known_patterns);
    println!("success rate: {:.1}%", info.success_rate * 100.0);
    println!("recommended wait strategy: {}", info.recommended_wait_strategy);
    if !info.recent_failures.is_empty() {
        println!("recent failures: {:?}", info.recent_failures);
    }
}

pub fn learning_stats(stats: &LearningStats, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(stats).unwrap());
        return;
    }

    println!("patterns:    {}", stats.registry_count);
    println!("predictions: {}", stats.predictor_count);
    println!("embeddings:  {}", stats.vector_count);
}
