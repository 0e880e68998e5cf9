//! Reload via an external executable.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::resilience::with_deadline;

/// Errors that can occur while running the reload action.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The command could not be started (missing, not executable, ...).
    #[error("failed to launch reload command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("reload command exited with {status}")]
    Failed { status: ExitStatus, output: String },

    /// The command did not finish before its deadline and was killed.
    #[error("reload command timed out after {0:?}")]
    Timeout(Duration),
}

impl ReloadError {
    /// Captured output, when the command got far enough to produce any.
    pub fn output(&self) -> Option<&str> {
        match self {
            ReloadError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Output of a successful reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutput {
    /// Standard output followed by standard error.
    pub output: String,
}

/// Something that makes the proxy pick up a new config.
#[async_trait]
pub trait Reloader: Send + Sync {
    async fn reload(&self) -> Result<ReloadOutput, ReloadError>;
}

/// Runs a fixed executable with no arguments.
#[derive(Debug, Clone)]
pub struct CommandReloader {
    command: PathBuf,
    timeout: Duration,
}

impl CommandReloader {
    pub fn new(command: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

#[async_trait]
impl Reloader for CommandReloader {
    async fn reload(&self) -> Result<ReloadOutput, ReloadError> {
        let command = self.command.display().to_string();

        let child = Command::new(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ReloadError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = with_deadline(self.timeout, child.wait_with_output())
            .await
            .map_err(|e| ReloadError::Timeout(e.0))?
            .map_err(|source| ReloadError::Spawn { command, source })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(ReloadOutput { output: combined })
        } else {
            Err(ReloadError::Failed {
                status: output.status,
                output: combined,
            })
        }
    }
}
