//! Config file persistence.
//!
//! The target is replaced with a rename so the proxy never reads a partially
//! written file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors that can occur while writing the rendered config.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The target path has no file name component.
    #[error("invalid config path: {0}")]
    InvalidPath(String),

    /// Creating, writing or renaming a file failed.
    #[error("failed to write config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes rendered configs to a fixed target path.
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    path: PathBuf,
}

impl ConfigWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file: `.<file-name>.tmp` in the target's directory.
    fn staging_path(&self) -> Result<PathBuf, WriteError> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| WriteError::InvalidPath(self.path.display().to_string()))?;
        let mut staged = std::ffi::OsString::from(".");
        staged.push(name);
        staged.push(".tmp");
        Ok(self.path.with_file_name(staged))
    }

    /// Replace the target file with `contents`.
    ///
    /// On failure the previous target is left untouched and the staging file
    /// is removed.
    pub async fn write(&self, contents: &[u8]) -> Result<(), WriteError> {
        let staging = self.staging_path()?;

        if let Err(e) = write_synced(&staging, contents).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error(&staging, e));
        }

        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error(&self.path, e));
        }

        tracing::info!(path = %self.path.display(), bytes = contents.len(), "Config file written");
        Ok(())
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

fn io_error(path: &Path, source: std::io::Error) -> WriteError {
    WriteError::Io {
        path: path.display().to_string(),
        source,
    }
}
