//! Reconciliation subsystem.
//!
//! # State Machine
//! ```text
//! Initializing ──fetch ok──▶ apply ──▶ Idle
//!      │                                │ ▲
//!   fetch err                        tick │ unchanged / fetch err /
//!      ▼                                ▼ │ applied (state replaced)
//!    fatal                          Reconciling
//! ```
//!
//! # Data Flow
//! ```text
//! tick
//!     → reconciler.rs (fetch under deadline → filter)
//!     → detector.rs (compare with applied state)
//!     → [changed] render → write → reload
//!     → runner.rs (replace applied state, wait for next tick)
//! ```
//!
//! # Design Decisions
//! - The applied state is a loop-local value passed into and out of each cycle
//! - A detected change replaces the state even if render/write/reload fail,
//!   so identical inventory on the next tick is not re-applied
//! - Fetch failures leave the state untouched

pub mod detector;
pub mod reconciler;
pub mod runner;

pub use detector::{changed, ChangeDetector};
pub use reconciler::{ApplyOutcome, CycleOutcome, Reconciler};
pub use runner::ReconcileLoop;
