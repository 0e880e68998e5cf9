//! Service inventory subsystem.
//!
//! # Data Flow
//! ```text
//! kubeconfig
//!     → source.rs (client, list Services over a Scope)
//!     → Vec<ServiceRecord> (raw, unfiltered)
//!     → filter.rs (LoadBalancer type + assigned address)
//!     → EndpointSet (discovery order, no dedup)
//! ```
//!
//! # Design Decisions
//! - The source is a trait so the loop can be driven without a cluster
//! - Filtering never fails; ineligible records are dropped, not errored
//! - No caching: every fetch is a fresh list call

pub mod filter;
pub mod source;
pub mod types;

pub use filter::filter;
pub use source::{connect, InventorySource, KubeInventory};
pub use types::{CredentialsError, Endpoint, EndpointSet, InventoryError, Scope, ServiceRecord};
