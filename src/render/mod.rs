//! Config generation subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointSet
//!     → template.rs (read template file, render with `services`)
//!     → rendered text (complete, or an error; never partial)
//!     → writer.rs (staging file, fsync, rename over target)
//! ```
//!
//! # Design Decisions
//! - Rendering is a pure function of template text and endpoint set
//! - Undefined template variables are errors, not empty strings
//! - The target file is replaced atomically

pub mod template;
pub mod watcher;
pub mod writer;

pub use template::{render, RenderError, TemplateRenderer};
pub use watcher::TemplateWatcher;
pub use writer::{ConfigWriter, WriteError};
