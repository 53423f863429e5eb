//! Sweep scheduler: probes every configured target on a fixed period.
//!
//! Starts in [`SchedulerPhase::Bootstrapping`] with one eager sweep, then
//! moves to [`SchedulerPhase::Steady`] and sweeps once per `interval`.
//! Ticks are anchored to the start of the bootstrap sweep. A sweep that
//! outlasts the period is followed immediately by the next one; sweeps
//! never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use upwatch_state::StatusStore;

use crate::checker::Prober;

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// First sweep in progress; unprobed targets show as pending.
    Bootstrapping,
    /// First sweep done; periodic sweeps running.
    Steady,
}

/// Summary of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub probed: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

/// Runs periodic probe sweeps and writes results into the status store.
pub struct SweepScheduler {
    store: StatusStore,
    prober: Arc<dyn Prober>,
    interval: Duration,
    max_concurrency: usize,
    phase_tx: watch::Sender<SchedulerPhase>,
}

impl SweepScheduler {
    pub fn new(store: StatusStore, prober: Arc<dyn Prober>, interval: Duration) -> Self {
        let (phase_tx, _) = watch::channel(SchedulerPhase::Bootstrapping);
        Self {
            store,
            prober,
            interval,
            max_concurrency: 8,
            phase_tx,
        }
    }

    /// Limit how many probes run at once within a sweep.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Observe phase transitions.
    pub fn phase(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase_tx.subscribe()
    }

    /// Run until `shutdown` flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            targets = self.store.targets().len(),
            interval_secs = self.interval.as_secs(),
            max_concurrency = self.max_concurrency,
            "sweep scheduler started"
        );

        let started = Instant::now();
        tokio::select! {
            report = self.sweep() => {
                info!(
                    probed = report.probed,
                    failures = report.failures,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "bootstrap sweep completed"
                );
            }
            _ = shutdown.changed() => {
                info!("sweep scheduler shutting down during bootstrap");
                return;
            }
        }
        self.phase_tx.send_replace(SchedulerPhase::Steady);

        let mut ticker = tokio::time::interval_at(started + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("sweep scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.sweep().await;
                    info!(
                        probed = report.probed,
                        failures = report.failures,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "sweep completed"
                    );
                }
            }
        }
    }

    /// Probe every target once. Each result is stored as soon as it lands.
    pub async fn sweep(&self) -> SweepReport {
        let start = Instant::now();
        let limiter = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for target in self.store.targets() {
            let url = target.url.clone();
            let store = self.store.clone();
            let prober = Arc::clone(&self.prober);
            let limiter = Arc::clone(&limiter);

            tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await.ok();
                let result = prober.probe(&url).await;
                let failed = !result.outcome.is_success();
                if let Some(e) = result.error() {
                    debug!(%url, error = %e, "target probe failed");
                }
                store.set(&url, result).await;
                failed
            });
        }

        let mut report = SweepReport {
            probed: 0,
            failures: 0,
            elapsed: Duration::ZERO,
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(failed) => {
                    report.probed += 1;
                    if failed {
                        report.failures += 1;
                    }
                }
                Err(e) => error!(error = %e, "probe task aborted"),
            }
        }
        report.elapsed = start.elapsed();
        report
    }
}
