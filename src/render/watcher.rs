//! Template file watcher.
//!
//! Signals the reconciliation loop when the template changes so the current
//! endpoint set can be re-applied without waiting for an inventory change.
//!
//! The parent directory is watched rather than the file, so saves that
//! replace the file through a rename keep being reported.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A watcher that monitors the template file for changes.
pub struct TemplateWatcher {
    path: PathBuf,
    change_tx: mpsc::UnboundedSender<()>,
}

impl TemplateWatcher {
    /// Create a new TemplateWatcher.
    ///
    /// Returns the watcher and a receiver that yields one item per change.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching.
    ///
    /// The returned handle must be kept alive for as long as changes should be
    /// reported.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx;
        let name: OsString = self
            .path
            .file_name()
            .ok_or_else(|| notify::Error::generic("template path has no file name"))?
            .to_os_string();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(name.as_os_str()));
                    if relevant && ours {
                        tracing::debug!(paths = ?event.paths, "Template change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Template watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Template watcher started");
        Ok(watcher)
    }
}
