//! Command-line and environment overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{CompareMode, LogFormat, WatcherConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "service-watcher")]
#[command(
    about = "Regenerates a proxy config from cluster LoadBalancer services and reloads the proxy",
    long_about = None
)]
pub struct Cli {
    /// TOML config file; flags and environment override its values
    #[arg(short, long, env = "WATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kubeconfig file to load
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace to watch (all namespaces when unset)
    #[arg(short, long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Label selector for listed services
    #[arg(short = 'l', long, env = "WATCH_SELECTOR")]
    pub selector: Option<String>,

    /// Template file to load
    #[arg(short, long, env = "TEMPLATE_FILE")]
    pub template: Option<PathBuf>,

    /// Configuration file to write
    #[arg(short, long, env = "CONFIG_FILE")]
    pub output: Option<PathBuf>,

    /// Reload script to launch
    #[arg(short, long, env = "RELOAD_SCRIPT")]
    pub reload_command: Option<PathBuf>,

    /// Seconds between inventory fetches
    #[arg(short = 'p', long, env = "SYNC_PERIOD")]
    pub sync_period: Option<u64>,

    /// Change detection mode
    #[arg(long, value_enum)]
    pub compare: Option<CompareArg>,

    /// Re-apply the current services when the template file changes
    #[arg(long)]
    pub watch_template: bool,

    /// Expose Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Enable debug messages
    #[arg(short, long)]
    pub debug: bool,

    /// Apply the current inventory once and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CompareArg {
    Strict,
    Normalized,
}

impl From<CompareArg> for CompareMode {
    fn from(arg: CompareArg) -> Self {
        match arg {
            CompareArg::Strict => CompareMode::Strict,
            CompareArg::Normalized => CompareMode::Normalized,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the config file,
    /// then flags and environment. The result is validated.
    pub fn resolve(&self) -> Result<WatcherConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => WatcherConfig::default(),
        };

        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut WatcherConfig) {
        if let Some(path) = &self.kubeconfig {
            config.cluster.kubeconfig = path.clone();
        }
        if let Some(ns) = &self.namespace {
            config.cluster.namespace = ns.clone();
        }
        if let Some(selector) = &self.selector {
            config.cluster.label_selector = selector.clone();
        }
        if let Some(path) = &self.template {
            config.template.path = path.clone();
        }
        if let Some(path) = &self.output {
            config.template.output = path.clone();
        }
        if self.watch_template {
            config.template.watch = true;
        }
        if let Some(cmd) = &self.reload_command {
            config.reload.command = cmd.clone();
        }
        if let Some(period) = self.sync_period {
            config.sync.period_secs = period;
        }
        if let Some(mode) = self.compare {
            config.sync.compare = mode.into();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format.into();
        }
        if self.debug {
            config.observability.log_level = "debug".to_string();
        }
    }
}
