//! Config rendering with MiniJinja.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

use crate::inventory::Endpoint;

/// Name of the single variable the template sees.
pub const SERVICES_KEY: &str = "services";

/// Errors that can occur while producing a config from the template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("failed to load template file {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The template failed to compile or evaluate.
    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Render `source` with the endpoint set bound to `services`.
///
/// Compile and evaluation errors are both reported as [`RenderError::Template`];
/// nothing is returned unless rendering completes.
pub fn render(source: &str, endpoints: &[Endpoint]) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);

    let ctx = BTreeMap::from([(SERVICES_KEY, endpoints)]);
    Ok(env.render_str(source, ctx)?)
}

/// Renders the template stored at a fixed path.
///
/// The file is read on every call so edits apply to the next render.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    path: PathBuf,
}

impl TemplateRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the template and render it against `endpoints`.
    pub async fn render(&self, endpoints: &[Endpoint]) -> Result<String, RenderError> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RenderError::Load {
                path: self.path.display().to_string(),
                source,
            })?;
        render(&source, endpoints)
    }
}
