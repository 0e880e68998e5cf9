//! Inventory data model and error definitions.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Service type that marks a record as externally load-balanced.
pub const LOAD_BALANCER_TYPE: &str = "LoadBalancer";

/// Query boundary for an inventory fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Namespace to list; `None` lists all namespaces.
    pub namespace: Option<String>,

    /// Label selector applied server-side (e.g. `"app=edge"`).
    pub label_selector: Option<String>,
}

impl Scope {
    /// Scope covering every namespace with no label selector.
    pub fn all_namespaces() -> Self {
        Self {
            namespace: None,
            label_selector: None,
        }
    }

    /// Build a scope from raw config values, treating empty strings as unset.
    pub fn from_config(namespace: &str, label_selector: &str) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            namespace: non_empty(namespace),
            label_selector: non_empty(label_selector),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::all_namespaces()
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "namespace {}", ns)?,
            None => write!(f, "all namespaces")?,
        }
        if let Some(selector) = &self.label_selector {
            write!(f, " ({})", selector)?;
        }
        Ok(())
    }
}

/// Raw service record as returned by an inventory source.
///
/// Only the fields the eligibility filter looks at are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceRecord {
    pub name: String,
    pub namespace: String,
    /// Exposure type (`ClusterIP`, `NodePort`, `LoadBalancer`, ...).
    pub service_type: Option<String>,
    /// Assigned external address, if any.
    pub address: Option<String>,
}

/// Canonical, externally-reachable service.
///
/// Field names are what templates see under `services`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub namespace: String,
    pub address: String,
}

/// Ordered collection of endpoints in discovery order.
pub type EndpointSet = Vec<Endpoint>;

/// Errors that can occur while fetching the inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The cluster API call failed.
    #[error("cannot list services: {0}")]
    Api(#[from] kube::Error),

    /// The fetch did not complete before its deadline.
    #[error("inventory fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that can occur while loading cluster credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The kubeconfig file could not be read or parsed.
    #[error("read kubeconfig {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// The kubeconfig was parsed but does not describe a usable context.
    #[error("load kubeconfig {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// A client could not be built from the resolved configuration.
    #[error("create client: {0}")]
    Client(#[from] kube::Error),
}
