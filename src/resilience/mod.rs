//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inventory fetch / reload command:
//!     → timeouts.rs (enforce deadline)
//!     → On expiry: distinct Timeout error, cycle continues next tick
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline; a hung call must not stall the loop
//! - No retries or backoff: the next tick is the retry

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
