//! Proxy reload subsystem.
//!
//! # Data Flow
//! ```text
//! config written
//!     → command.rs (spawn executable, no args, stdin closed)
//!     → combined stdout+stderr captured, under a deadline
//!     → Ok(ReloadOutput) | Err(Spawn | Failed | Timeout)
//! ```
//!
//! # Design Decisions
//! - Reload failures are logged by the loop, never escalated
//! - A timed-out command is killed when its handle is dropped

pub mod command;

pub use command::{CommandReloader, ReloadError, ReloadOutput, Reloader};
