//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the service watcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    /// Cluster access and inventory scope.
    pub cluster: ClusterConfig,

    /// Template source and rendered output.
    pub template: TemplateConfig,

    /// Proxy reload action.
    pub reload: ReloadConfig,

    /// Reconciliation cadence and change detection.
    pub sync: SyncConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Cluster access configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Path to the kubeconfig file.
    pub kubeconfig: PathBuf,

    /// Namespace to watch; empty watches all namespaces.
    pub namespace: String,

    /// Label selector narrowing the listed services; empty selects all.
    pub label_selector: String,

    /// Deadline for one inventory fetch in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: default_kubeconfig(),
            namespace: String::new(),
            label_selector: String::new(),
            fetch_timeout_secs: 30,
        }
    }
}

impl ClusterConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// `$HOME/.kube/config`, or `.kube/config` when `HOME` is unset.
fn default_kubeconfig() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".kube")
        .join("config")
}

/// Template configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template file to render.
    pub path: PathBuf,

    /// Config file to write.
    pub output: PathBuf,

    /// Re-apply the current endpoint set when the template file changes.
    pub watch: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config.tmpl"),
            output: PathBuf::from("config.conf"),
            watch: false,
        }
    }
}

/// Reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReloadConfig {
    /// Executable launched (without arguments) after a config is written.
    pub command: PathBuf,

    /// Deadline for the reload command in seconds.
    pub timeout_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("./reload.sh"),
            timeout_secs: 60,
        }
    }
}

impl ReloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How two endpoint sets are compared.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Position-by-position; a reorder counts as a change.
    #[default]
    Strict,
    /// Sorted by namespace, name and address before comparing.
    Normalized,
}

/// Reconciliation loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Period between inventory fetches in seconds.
    pub period_secs: u64,

    /// Change detection mode.
    pub compare: CompareMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            period_secs: 10,
            compare: CompareMode::Strict,
        }
    }
}

impl SyncConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
