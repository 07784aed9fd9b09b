//! Fleet health supervision.
//!
//! A health probe is a lightweight backend call wrapped into a boolean —
//! it never errors and has no side effects. The orchestrator probes the
//! whole fleet concurrently at startup and on demand.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ─── BackendHealth ───────────────────────────────────────────────────────────

/// Outcome of one backend probe.
#[derive(Debug, Clone, Serialize)]
pub struct BackendHealth {
    pub backend: &'static str,
    pub healthy: bool,
    pub checked_at: DateTime<Utc>,
    pub latency_ms: u64,
}

impl BackendHealth {
    /// Run a probe, timing it and stamping the result.
    pub(crate) async fn measure<F>(backend: &'static str, probe: F) -> Self
    where
        F: Future<Output = bool>,
    {
        let start = Instant::now();
        let healthy = probe.await;
        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(backend, healthy, latency_ms, "health probe");
        Self {
            backend,
            healthy,
            checked_at: Utc::now(),
            latency_ms,
        }
    }
}

// ─── HealthReport ────────────────────────────────────────────────────────────

/// Probe results across the whole fleet.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub backends: Vec<BackendHealth>,
}

impl HealthReport {
    /// Whether every backend answered its probe.
    pub fn all_healthy(&self) -> bool {
        self.backends.iter().all(|b| b.healthy)
    }

    /// Names of the backends that failed their probe.
    pub fn unhealthy(&self) -> Vec<&'static str> {
        self.backends
            .iter()
            .filter(|b| !b.healthy)
            .map(|b| b.backend)
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_measure_stamps_result() {
        let health = BackendHealth::measure("sonarr", async { true }).await;
        assert_eq!(health.backend, "sonarr");
        assert!(health.healthy);
    }

    #[tokio::test]
    async fn test_report_accessors() {
        let report = HealthReport {
            backends: vec![
                BackendHealth::measure("sabnzbd", async { true }).await,
                BackendHealth::measure("plex", async { false }).await,
            ],
        };
        assert!(!report.all_healthy());
        assert_eq!(report.unhealthy(), vec!["plex"]);
    }

    #[tokio::test]
    async fn test_empty_report_is_healthy() {
        let report = HealthReport { backends: vec![] };
        assert!(report.all_healthy());
        assert!(report.unhealthy().is_empty());
    }
}
