//! One reconciliation cycle: fetch, filter, detect, apply.

use std::time::{Duration, Instant};

use crate::config::CompareMode;
use crate::inventory::{filter, Endpoint, EndpointSet, InventoryError, InventorySource, Scope};
use crate::observability::metrics;
use crate::reconcile::detector::ChangeDetector;
use crate::reload::{ReloadError, ReloadOutput, Reloader};
use crate::render::{ConfigWriter, RenderError, TemplateRenderer, WriteError};
use crate::resilience::with_deadline;

/// Result of applying an endpoint set.
///
/// Stages run in order; the first failing stage ends the apply.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// The template could not be loaded or rendered. Nothing was written.
    RenderFailed(RenderError),
    /// The config could not be written. Reload was not attempted.
    WriteFailed(WriteError),
    /// The config was written but the reload action failed.
    ReloadFailed(ReloadError),
    /// The config was written and the reload action succeeded.
    Reloaded(ReloadOutput),
}

impl ApplyOutcome {
    pub fn is_reloaded(&self) -> bool {
        matches!(self, ApplyOutcome::Reloaded(_))
    }

    /// True when the reload action was invoked, whatever its result.
    pub fn reload_attempted(&self) -> bool {
        matches!(self, ApplyOutcome::Reloaded(_) | ApplyOutcome::ReloadFailed(_))
    }
}

/// Result of one tick.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The inventory could not be fetched; state is unchanged.
    FetchFailed(InventoryError),
    /// The inventory matches the applied state; nothing was done.
    Unchanged,
    /// A change was detected and applied (possibly unsuccessfully).
    Applied(ApplyOutcome),
}

impl CycleOutcome {
    /// Label used for the cycle counter.
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::FetchFailed(_) => "fetch_failed",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Applied(_) => "applied",
        }
    }
}

/// Drives inventory, rendering and reload for one target config.
///
/// Holds no endpoint state: the applied set is passed in and handed back by
/// each call.
pub struct Reconciler<S, R> {
    source: S,
    scope: Scope,
    fetch_timeout: Duration,
    detector: ChangeDetector,
    renderer: TemplateRenderer,
    writer: ConfigWriter,
    reloader: R,
}

impl<S, R> Reconciler<S, R>
where
    S: InventorySource,
    R: Reloader,
{
    pub fn new(
        source: S,
        renderer: TemplateRenderer,
        writer: ConfigWriter,
        reloader: R,
    ) -> Self {
        Self {
            source,
            scope: Scope::all_namespaces(),
            fetch_timeout: Duration::from_secs(30),
            detector: ChangeDetector::default(),
            renderer,
            writer,
            reloader,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.detector = ChangeDetector::new(mode);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn reloader(&self) -> &R {
        &self.reloader
    }

    /// Fetch the inventory under the deadline and filter it.
    pub async fn observe(&self) -> Result<EndpointSet, InventoryError> {
        let records = with_deadline(self.fetch_timeout, self.source.fetch(&self.scope))
            .await
            .map_err(|e| InventoryError::Timeout(e.0))??;
        Ok(filter(&records))
    }

    /// Initial fetch and apply.
    ///
    /// A fetch failure is returned to the caller; apply failures are logged
    /// and do not prevent the set from becoming the initial state.
    pub async fn initialize(&self) -> Result<(EndpointSet, ApplyOutcome), InventoryError> {
        tracing::info!(scope = %self.scope, "Initial service fetch");
        let endpoints = self.observe().await?;
        let outcome = self.apply(&endpoints).await;
        metrics::record_endpoints(endpoints.len());
        Ok((endpoints, outcome))
    }

    /// Run one cycle against the applied `state`, returning the new state.
    ///
    /// On fetch failure the state is returned unchanged. When a change is
    /// detected the new set becomes the state even if applying it failed.
    pub async fn reconcile(&self, state: EndpointSet) -> (EndpointSet, CycleOutcome) {
        let started = Instant::now();

        let (state, outcome) = match self.observe().await {
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch services");
                (state, CycleOutcome::FetchFailed(e))
            }
            Ok(current) if !self.detector.changed(&state, &current) => {
                tracing::debug!(endpoints = current.len(), "Services unchanged");
                (state, CycleOutcome::Unchanged)
            }
            Ok(current) => {
                tracing::info!(
                    previous = state.len(),
                    current = current.len(),
                    "Services have changed, reload fired"
                );
                let outcome = self.apply(&current).await;
                metrics::record_endpoints(current.len());
                (current, CycleOutcome::Applied(outcome))
            }
        };

        metrics::record_cycle(outcome.label(), started.elapsed());
        (state, outcome)
    }

    /// Render, write and reload for `endpoints`.
    pub async fn apply(&self, endpoints: &[Endpoint]) -> ApplyOutcome {
        log_endpoints(endpoints);

        let rendered = match self.renderer.render(endpoints).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(template = %self.renderer.path().display(), error = %e, "Failed to render config");
                metrics::record_apply_failure("render");
                return ApplyOutcome::RenderFailed(e);
            }
        };

        if let Err(e) = self.writer.write(rendered.as_bytes()).await {
            tracing::error!(error = %e, "Failed to write config file");
            metrics::record_apply_failure("write");
            return ApplyOutcome::WriteFailed(e);
        }

        tracing::info!("Ready to reload proxy");
        match self.reloader.reload().await {
            Ok(out) => {
                tracing::info!(output = %out.output.trim_end(), "Reload succeeded");
                metrics::record_reload(true);
                ApplyOutcome::Reloaded(out)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    output = e.output().unwrap_or("").trim_end(),
                    "Error reloading proxy"
                );
                metrics::record_reload(false);
                ApplyOutcome::ReloadFailed(e)
            }
        }
    }
}

fn log_endpoints(endpoints: &[Endpoint]) {
    for (n, endpoint) in endpoints.iter().enumerate() {
        tracing::info!(
            index = n,
            name = %endpoint.name,
            namespace = %endpoint.namespace,
            address = %endpoint.address,
            "Service"
        );
    }
}
