//! Service watcher library.
//!
//! Keeps a proxy config in sync with the cluster's LoadBalancer services.

pub mod config;
pub mod inventory;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod reload;
pub mod render;
pub mod resilience;

pub use config::schema::WatcherConfig;
pub use inventory::{Endpoint, EndpointSet};
pub use lifecycle::Shutdown;
pub use reconcile::{ReconcileLoop, Reconciler};
