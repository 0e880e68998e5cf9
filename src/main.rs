//! Service Watcher
//!
//! Polls the cluster for LoadBalancer services, renders a proxy config from a
//! template whenever the set changes, and runs a reload command.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── SERVICE WATCHER ────────────────────────────┐
//!   │                                                                          │
//!   │   ticker ──▶ ┌───────────┐   ┌────────┐   ┌──────────┐                  │
//!   │              │ inventory │──▶│ filter │──▶│ detector │── unchanged ──┐  │
//!   │              └─────┬─────┘   └────────┘   └────┬─────┘               │  │
//!   │                    │ K8s API                   │ changed             │  │
//!   │                    ▼                           ▼                     │  │
//!   │              ┌───────────┐   ┌────────┐   ┌──────────┐               │  │
//!   │              │  cluster  │   │ render │──▶│  writer  │──▶ reload ────┤  │
//!   │              └───────────┘   └────────┘   └──────────┘     command   │  │
//!   │                                                                      ▼  │
//!   │                                                        applied state    │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use service_watcher::config::Cli;
use service_watcher::lifecycle::{signals, startup, Shutdown};
use service_watcher::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        kubeconfig = %config.cluster.kubeconfig.display(),
        template = %config.template.path.display(),
        output = %config.template.output.display(),
        reload_command = %config.reload.command.display(),
        period_secs = config.sync.period_secs,
        compare = ?config.sync.compare,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_handler(&shutdown);

    if let Err(e) = startup::start(config, cli.once, shutdown).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
