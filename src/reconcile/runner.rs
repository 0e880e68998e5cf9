//! The periodic reconciliation loop.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::inventory::{EndpointSet, InventorySource};
use crate::reconcile::reconciler::Reconciler;
use crate::reload::Reloader;

/// Longest period the ticker is armed with; larger values are clamped.
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Owns the applied endpoint set and drives [`Reconciler`] on a fixed period.
pub struct ReconcileLoop<S, R> {
    reconciler: Reconciler<S, R>,
    period: Duration,
    template_changes: Option<mpsc::UnboundedReceiver<()>>,
}

impl<S, R> ReconcileLoop<S, R>
where
    S: InventorySource,
    R: Reloader,
{
    pub fn new(reconciler: Reconciler<S, R>, period: Duration) -> Self {
        Self {
            reconciler,
            period,
            template_changes: None,
        }
    }

    /// Re-apply the current state whenever `changes` yields.
    pub fn with_template_changes(mut self, changes: mpsc::UnboundedReceiver<()>) -> Self {
        self.template_changes = Some(changes);
        self
    }

    pub fn reconciler(&self) -> &Reconciler<S, R> {
        &self.reconciler
    }

    /// Run until `shutdown` fires, starting from the initial `state`.
    ///
    /// The first tick happens one period after the call. Cycles never
    /// overlap; a slow cycle delays the next tick. Returns the final state.
    pub async fn run(
        mut self,
        mut state: EndpointSet,
        mut shutdown: broadcast::Receiver<()>,
    ) -> EndpointSet {
        let period = self.period.min(MAX_PERIOD);
        let start = Instant::now()
            .checked_add(period)
            .unwrap_or_else(|| Instant::now() + MAX_PERIOD);
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        tracing::info!(period = ?self.period, "Reconciliation loop starting");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    cycle += 1;
                    let (next, _) = self
                        .reconciler
                        .reconcile(state)
                        .instrument(tracing::info_span!("cycle", cycle))
                        .await;
                    state = next;
                }
                changed = next_change(&mut self.template_changes) => {
                    match changed {
                        Some(()) => {
                            drain(&mut self.template_changes);
                            tracing::info!(endpoints = state.len(), "Template changed, re-applying current services");
                            self.reconciler.apply(&state).await;
                        }
                        None => {
                            tracing::warn!("Template watcher stopped");
                            self.template_changes = None;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        state
    }
}

/// Next template change, or pending forever when not watching.
async fn next_change(changes: &mut Option<mpsc::UnboundedReceiver<()>>) -> Option<()> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Collapse a burst of change events into one re-apply.
fn drain(changes: &mut Option<mpsc::UnboundedReceiver<()>>) {
    if let Some(rx) = changes {
        while rx.try_recv().is_ok() {}
    }
}
