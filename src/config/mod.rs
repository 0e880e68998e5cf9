//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → CLI flags / environment (cli.rs)
//!     → validation.rs (semantic checks)
//!     → WatcherConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - No runtime reconfiguration; changes require a restart
//! - All fields have defaults to allow running with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{
    ClusterConfig, CompareMode, LogFormat, ObservabilityConfig, ReloadConfig, SyncConfig,
    TemplateConfig, WatcherConfig,
};
