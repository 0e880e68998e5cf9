//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Cluster client → Initial fetch + apply → Loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Loop exits after the in-flight cycle → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: metrics first, then client, then the loop
//! - No cleanup on shutdown: the last written config stays in place

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
