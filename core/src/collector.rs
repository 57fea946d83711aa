//! # Collection Scheduler
//!
//! One background task, one cycle at a time: correlate, fold, upsert. A cycle that
//! fails for any reason is logged and skipped; the task itself only ends on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::aggregate::fold;
use crate::error::ServiceError;
use crate::service::{ConnectionsService, WRITE_TIMEOUT, bounded};
use crate::store::CounterStore;

/// What a single cycle achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Updated { domains: usize, destinations: usize },
    Skipped { reason: String },
}

pub struct Collector {
    connections: ConnectionsService,
    store: Arc<dyn CounterStore>,
    interval: Duration,
}

impl Collector {
    pub fn new(connections: ConnectionsService, store: Arc<dyn CounterStore>, interval: Duration) -> Self {
        Self {
            connections,
            store,
            interval,
        }
    }

    /// Runs one best-effort cycle. Never fails; a failed cycle leaves the store untouched
    /// for that round and reports why.
    pub async fn tick(&self) -> CycleOutcome {
        match self.cycle().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "collection cycle skipped");
                CycleOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn cycle(&self) -> Result<CycleOutcome, ServiceError> {
        let connections = self.connections.get_connections().await?;
        let batch = fold(&connections);

        bounded("writing domain counters", WRITE_TIMEOUT, self.store.upsert_domain_counts(&batch.domains)).await?;
        bounded(
            "writing destination counters",
            WRITE_TIMEOUT,
            self.store.upsert_destination_counts(&batch.destinations),
        )
        .await?;

        debug!(
            connections = connections.len(),
            domains = batch.domains.len(),
            destinations = batch.destinations.len(),
            "collection cycle stored"
        );
        Ok(CycleOutcome::Updated {
            domains: batch.domains.len(),
            destinations: batch.destinations.len(),
        })
    }

    /// Ticks every `interval`, first one interval after the call, until `shutdown`
    /// becomes `true` or its sender goes away.
    ///
    /// A slow cycle delays the following ones; cycles never overlap. Shutdown is only
    /// observed between cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        // interval_at panics on a zero period.
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?period, "collector started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("collector stopped");
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
