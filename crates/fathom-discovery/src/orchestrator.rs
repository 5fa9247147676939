//! C10: the Discovery Orchestrator. Runs a bounded, idempotent probe sweep
//! per domain and feeds successes to the learning consumer as
//! `LearningEvent::ProbeSucceeded` (spec.md §4.6).
//!
//! Grounded on `riptide-stealth::rate_limiter::RateLimiter`'s per-domain
//! `DashMap` state shape, simplified from continuous adaptive throttling to
//! a one-shot idempotent-per-TTL sweep — this component doesn't crawl, it
//! probes a fixed short list once per domain per window.

use crate::gate::LiveRequestGate;
use crate::paths::PROBE_TARGETS;
use crate::probe::{classify_status, ProbeOutcome};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fathom_types::{DiscoveryConfig, LearningEvent};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

pub struct DiscoveryOrchestrator {
    client: Client,
    config: DiscoveryConfig,
    last_probed: DashMap<String, DateTime<Utc>>,
    probe_gate: Arc<Semaphore>,
    live_gate: LiveRequestGate,
    learning_tx: mpsc::UnboundedSender<LearningEvent>,
}

/// One domain sweep's tally, for callers/tests that want visibility beyond
/// the emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub probed: usize,
    pub succeeded: usize,
    pub skipped_idempotent: bool,
}

impl DiscoveryOrchestrator {
    pub fn new(config: DiscoveryConfig, learning_tx: mpsc::UnboundedSender<LearningEvent>, live_gate: LiveRequestGate) -> Self {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("reqwest client with no-redirect policy");

        Self {
            client,
            probe_gate: Arc::new(Semaphore::new(config.max_concurrent_probes)),
            config,
            last_probed: DashMap::new(),
            live_gate,
            learning_tx,
        }
    }

    /// Probe `domain` (bare host, e.g. `"example.com"`) over `https`. A
    /// no-op, returning `skipped_idempotent = true`, if this domain was
    /// swept within `domain_ttl_secs`.
    pub async fn probe_domain(&self, domain: &str) -> SweepSummary {
        let now = Utc::now();
        if let Some(last) = self.last_probed.get(domain) {
            if (now - *last).num_seconds() < self.config.domain_ttl_secs {
                debug!(%domain, "discovery probe skipped, within ttl");
                return SweepSummary { skipped_idempotent: true, ..Default::default() };
            }
        }

        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.max_duration_ms);
        let mut summary = SweepSummary::default();

        for (path, method) in PROBE_TARGETS {
            if Instant::now() >= deadline {
                debug!(%domain, "discovery sweep hit maxDuration, stopping early");
                break;
            }

            // Strictly lower priority than live traffic: back off while any
            // live request is in flight rather than contend for the socket.
            while self.live_gate.is_busy() {
                if Instant::now() >= deadline {
                    break;
                }
                tokio::task::yield_now().await;
            }

            let Ok(_permit) = self.probe_gate.clone().acquire_owned().await else { continue };

            summary.probed += 1;
            if let Some(outcome) = self.run_probe(domain, path, method).await {
                if let ProbeOutcome::Success { requires_auth } = outcome {
                    summary.succeeded += 1;
                    let url = format!("https://{domain}{path}");
                    let _ = self.learning_tx.send(LearningEvent::ProbeSucceeded {
                        domain: domain.to_string(),
                        url,
                        method: (*method).to_string(),
                        requires_auth,
                    });
                }
            }
        }

        self.last_probed.insert(domain.to_string(), now);
        summary
    }

    async fn run_probe(&self, domain: &str, path: &str, method: &str) -> Option<ProbeOutcome> {
        let method = Method::from_str(method).ok()?;
        let url = format!("https://{domain}{path}");
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);

        let result = tokio::time::timeout(timeout, self.client.request(method, &url).send()).await;
        match result {
            Ok(Ok(response)) => Some(classify_status(response.status().as_u16())),
            Ok(Err(e)) => {
                debug!(%domain, %path, error = %e, "probe request failed");
                None
            }
            Err(_) => {
                debug!(%domain, %path, "probe timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> (DiscoveryOrchestrator, mpsc::UnboundedReceiver<LearningEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = DiscoveryConfig { max_duration_ms: 1, probe_timeout_ms: 1, domain_ttl_secs: 3600, max_concurrent_probes: 2 };
        (DiscoveryOrchestrator::new(config, tx, LiveRequestGate::new()), rx)
    }

    #[tokio::test]
    async fn second_sweep_within_ttl_is_skipped() {
        let (orchestrator, _rx) = orchestrator();
        let first = orchestrator.probe_domain("example.invalid").await;
        assert!(!first.skipped_idempotent);

        let second = orchestrator.probe_domain("example.invalid").await;
        assert!(second.skipped_idempotent);
    }

    #[tokio::test]
    async fn tiny_max_duration_stops_the_sweep_early() {
        let (orchestrator, _rx) = orchestrator();
        let summary = orchestrator.probe_domain("example.invalid").await;
        // max_duration_ms=1 means the deadline is very likely to have
        // already passed before or just after the first probe attempt.
        assert!(summary.probed <= PROBE_TARGETS.len());
    }
}
