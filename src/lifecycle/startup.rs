//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics endpoint when enabled
//! - Build the cluster client from the kubeconfig
//! - Perform the initial fetch and apply
//! - Start the template watcher and hand over to the reconciliation loop
//!
//! # Design Decisions
//! - Fail fast: credential errors and a failed initial fetch are fatal
//! - Apply failures during startup are logged, not fatal

use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

use crate::config::WatcherConfig;
use crate::inventory::{
    self, CredentialsError, EndpointSet, InventoryError, InventorySource, KubeInventory, Scope,
};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::reconcile::{ReconcileLoop, Reconciler};
use crate::reload::{CommandReloader, Reloader};
use crate::render::{ConfigWriter, TemplateRenderer, TemplateWatcher};

/// Errors that abort the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create client: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("failed initial service fetch: {0}")]
    InitialFetch(#[source] InventoryError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Build a reconciler for `config` around the given source and reloader.
pub fn build_reconciler<S, R>(source: S, reloader: R, config: &WatcherConfig) -> Reconciler<S, R>
where
    S: InventorySource,
    R: Reloader,
{
    Reconciler::new(
        source,
        TemplateRenderer::new(&config.template.path),
        ConfigWriter::new(&config.template.output),
        reloader,
    )
    .with_scope(Scope::from_config(
        &config.cluster.namespace,
        &config.cluster.label_selector,
    ))
    .with_fetch_timeout(config.cluster.fetch_timeout())
    .with_compare_mode(config.sync.compare)
}

/// Start the watcher against the cluster described by `config`.
pub async fn start(config: WatcherConfig, once: bool, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let client = inventory::connect(&config.cluster.kubeconfig).await?;
    let reloader = CommandReloader::new(&config.reload.command, config.reload.timeout());
    let reconciler = build_reconciler(KubeInventory::new(client), reloader, &config);

    run(reconciler, &config, once, shutdown).await.map(|_| ())
}

/// Initialize, then run the loop until shutdown (or return at once in
/// `once` mode). Returns the last applied endpoint set.
pub async fn run<S, R>(
    reconciler: Reconciler<S, R>,
    config: &WatcherConfig,
    once: bool,
    shutdown: Shutdown,
) -> Result<EndpointSet, StartupError>
where
    S: InventorySource,
    R: Reloader,
{
    let shutdown_rx = shutdown.subscribe();

    let (state, _) = reconciler
        .initialize()
        .await
        .map_err(StartupError::InitialFetch)?;

    if once {
        tracing::info!(endpoints = state.len(), "Single pass complete");
        return Ok(state);
    }

    let mut reconcile_loop = ReconcileLoop::new(reconciler, config.sync.period());

    // Dropping the handle stops the watcher, so it lives until the loop ends.
    let mut _watch_handle = None;
    if config.template.watch {
        let (watcher, changes) = TemplateWatcher::new(&config.template.path);
        match watcher.run() {
            Ok(handle) => {
                _watch_handle = Some(handle);
                reconcile_loop = reconcile_loop.with_template_changes(changes);
            }
            Err(e) => tracing::warn!(error = %e, "Template watching disabled"),
        }
    }

    Ok(reconcile_loop.run(state, shutdown_rx).await)
}
