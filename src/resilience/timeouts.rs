//! Timeout enforcement.
//!
//! # Responsibilities
//! - Put a deadline on every external call (inventory fetch, reload command)
//! - Report deadline exhaustion as its own error kind
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Callers map [`DeadlineExceeded`] into their own `Timeout` variant

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Marker returned when a deadline elapses before the future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` to completion or until `deadline` elapses.
///
/// The future is dropped on expiry.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
