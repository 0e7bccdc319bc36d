//! Reconciler — the periodic liveness and eviction cycle.
//!
//! Each invocation runs two ordered phases: re-probe every registered
//! endpoint, refreshing `last_seen` on every successful probe and the
//! online flag where it flipped, then evict endpoints the store reports
//! as unreachable past the retention window. Eviction runs second so it
//! sees freshly refreshed liveness data.
//!
//! Overlapping invocations are tolerated (duplicate probes are harmless)
//! but a try-lock guard skips them rather than queueing.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use shardgate_core::Endpoint;

use crate::error::RegistryResult;
use crate::registry::Registry;

/// Reconciliation tuning knobs.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Per-endpoint probe timeout during status refresh.
    pub refresh_timeout: Duration,
    /// How long a continuously-unreachable endpoint is retained.
    pub retention: Duration,
    /// Maximum in-flight probes during refresh.
    pub probe_concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(3),
            retention: Duration::from_secs(72 * 3600),
            probe_concurrency: 16,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Endpoints probed during status refresh.
    pub probed: usize,
    /// Endpoints whose online flag flipped.
    pub status_changes: usize,
    /// Stale endpoints removed.
    pub evicted: usize,
}

/// Result of invoking a cycle: either it ran, or another cycle was
/// already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    Skipped,
}

/// The periodic reconciliation task over a shared registry.
pub struct Reconciler {
    registry: Arc<Registry>,
    config: ReconcilerConfig,
    /// Single-flight guard; an overlapping cycle is skipped.
    cycle_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(registry: Arc<Registry>, config: ReconcilerConfig) -> Self {
        Self {
            registry,
            config,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one reconciliation cycle: status refresh, then eviction.
    ///
    /// Per-endpoint probe and store failures are logged and skipped; only
    /// the stale-row query itself can fail the cycle.
    pub async fn run_cycle(&self) -> RegistryResult<CycleOutcome> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            debug!("reconciliation cycle already in flight, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let mut report = CycleReport::default();

        // Phase 1: status refresh. Probes run concurrently, bounded so a
        // large fleet never serialises behind one connect attempt.
        let snapshot = self.registry.list_all().await;
        let timeout = self.config.refresh_timeout;
        let results: Vec<(Endpoint, bool)> = stream::iter(snapshot)
            .map(|ep| async move {
                let reachable = shardgate_probe::probe(&ep.host, ep.port, timeout).await;
                (ep, reachable)
            })
            .buffer_unordered(self.config.probe_concurrency.max(1))
            .collect()
            .await;

        report.probed = results.len();
        for (ep, reachable) in results {
            let changed = reachable != ep.online;
            // Every successful probe refreshes last_seen, flag change or
            // not; retention counts from the last successful probe. An
            // unchanged unreachable endpoint needs no write at all.
            if !changed && !reachable {
                continue;
            }
            match self.registry.set_status(&ep.name, reachable).await {
                Ok(()) if changed => {
                    info!(name = %ep.name, online = reachable, "endpoint status changed");
                    report.status_changes += 1;
                }
                Ok(()) => {}
                Err(e) => warn!(name = %ep.name, error = %e, "status update failed"),
            }
        }

        // Phase 2: eviction, sequential, via the registry's remove path
        // so routing and memory are cleaned alongside the store.
        let stale = self
            .registry
            .store()
            .list_stale_since(self.config.retention)
            .await?;
        for ep in stale {
            match self.registry.remove(&ep.name).await {
                Ok(_) => {
                    info!(name = %ep.name, last_seen = %ep.last_seen, "evicted stale endpoint");
                    report.evicted += 1;
                }
                Err(e) => warn!(name = %ep.name, error = %e, "eviction failed"),
            }
        }

        info!(
            probed = report.probed,
            status_changes = report.status_changes,
            evicted = report.evicted,
            "reconciliation cycle complete"
        );
        Ok(CycleOutcome::Completed(report))
    }

    /// Run the reconciliation loop until shutdown.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "reconciler started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::error!(error = %e, "reconciliation cycle failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("reconciler shutting down");
                    break;
                }
            }
        }
    }
}
