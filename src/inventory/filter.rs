//! Eligibility filter: raw service records to endpoints.

use crate::inventory::types::{Endpoint, EndpointSet, ServiceRecord, LOAD_BALANCER_TYPE};

/// Keep only load-balanced services that have an address assigned.
///
/// Output order follows input order; duplicates are preserved.
pub fn filter(records: &[ServiceRecord]) -> EndpointSet {
    records.iter().filter_map(eligible).collect()
}

/// Map one record to an endpoint, or `None` if it is not eligible.
pub fn eligible(record: &ServiceRecord) -> Option<Endpoint> {
    tracing::debug!(
        namespace = %record.namespace,
        name = %record.name,
        service_type = record.service_type.as_deref().unwrap_or(""),
        "Service candidate"
    );

    if record.service_type.as_deref() != Some(LOAD_BALANCER_TYPE) {
        tracing::debug!(name = %record.name, "Dropped candidate: not a load balancer");
        return None;
    }

    let address = match record.address.as_deref() {
        Some(addr) if !addr.is_empty() => addr,
        _ => {
            tracing::debug!(name = %record.name, "Dropped candidate: no load balancer address");
            return None;
        }
    };

    let endpoint = Endpoint {
        name: record.name.clone(),
        namespace: record.namespace.clone(),
        address: address.to_string(),
    };
    tracing::debug!(?endpoint, "Candidate accepted");
    Some(endpoint)
}
