//! Inventory sources.
//!
//! # Responsibilities
//! - Build a cluster client from a kubeconfig file
//! - List `Service` objects over the configured scope
//! - Flatten each object into a [`ServiceRecord`]

use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::inventory::types::{CredentialsError, InventoryError, Scope, ServiceRecord};

/// A source of raw service records.
///
/// Implementations hold no reconciliation state; each call is independent.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List every service record visible within `scope`.
    async fn fetch(&self, scope: &Scope) -> Result<Vec<ServiceRecord>, InventoryError>;
}

/// Build a client from the kubeconfig at `path` using its current context.
pub async fn connect(path: &Path) -> Result<Client, CredentialsError> {
    let shown = path.display().to_string();

    let kubeconfig = Kubeconfig::read_from(path).map_err(|source| CredentialsError::Read {
        path: shown.clone(),
        source,
    })?;

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|source| CredentialsError::Config {
            path: shown.clone(),
            source,
        })?;

    tracing::info!(
        kubeconfig = %shown,
        cluster_url = %config.cluster_url,
        "Cluster client configured"
    );

    Ok(Client::try_from(config)?)
}

/// Inventory source backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeInventory {
    client: Client,
}

impl KubeInventory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubeInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeInventory").finish_non_exhaustive()
    }
}

#[async_trait]
impl InventorySource for KubeInventory {
    async fn fetch(&self, scope: &Scope) -> Result<Vec<ServiceRecord>, InventoryError> {
        let api: Api<Service> = match &scope.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let mut params = ListParams::default();
        if let Some(selector) = &scope.label_selector {
            params = params.labels(selector);
        }

        let list = api.list(&params).await?;
        tracing::debug!(%scope, count = list.items.len(), "Listed services");

        Ok(list.items.iter().map(record_from_service).collect())
    }
}

/// Flatten a `Service` object into the fields the filter needs.
///
/// The address is the requested `spec.loadBalancerIP` when set, otherwise the
/// first ingress point reported in the service status (IP before hostname).
pub fn record_from_service(service: &Service) -> ServiceRecord {
    let meta = &service.metadata;
    let spec = service.spec.as_ref();

    let requested = spec
        .and_then(|s| s.load_balancer_ip.clone())
        .filter(|ip| !ip.is_empty());

    let assigned = || {
        service
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|ingress| ingress.first())
            .and_then(|point| {
                point
                    .ip
                    .clone()
                    .filter(|ip| !ip.is_empty())
                    .or_else(|| point.hostname.clone().filter(|h| !h.is_empty()))
            })
    };

    ServiceRecord {
        name: meta.name.clone().unwrap_or_default(),
        namespace: meta.namespace.clone().unwrap_or_default(),
        service_type: spec.and_then(|s| s.type_.clone()),
        address: requested.or_else(assigned),
    }
}
