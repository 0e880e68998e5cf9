//! Shared fixtures for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use service_watcher::config::WatcherConfig;
use service_watcher::inventory::{InventoryError, InventorySource, Scope, ServiceRecord};
use service_watcher::reload::{ReloadError, ReloadOutput, Reloader};
use tempfile::TempDir;

/// Template used by most tests: one line per service.
pub const TEMPLATE: &str =
    "{% for s in services %}server {{ s.namespace }}/{{ s.name }} {{ s.address }}\n{% endfor %}# {{ services | length }} services\n";

pub fn load_balancer(name: &str, address: &str) -> ServiceRecord {
    ServiceRecord {
        name: name.to_string(),
        namespace: "default".to_string(),
        service_type: Some("LoadBalancer".to_string()),
        address: Some(address.to_string()),
    }
}

pub fn cluster_ip(name: &str, address: &str) -> ServiceRecord {
    ServiceRecord {
        service_type: Some("ClusterIP".to_string()),
        ..load_balancer(name, address)
    }
}

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum Step {
    Records(Vec<ServiceRecord>),
    Fail,
    Hang,
}

/// Inventory source that plays back a script, then repeats the last records.
#[derive(Clone)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<Step>>>,
    last: Arc<Mutex<Vec<ServiceRecord>>>,
    pub fetches: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            last: Arc::new(Mutex::new(Vec::new())),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for ScriptedSource {
    async fn fetch(&self, _scope: &Scope) -> Result<Vec<ServiceRecord>, InventoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Records(records)) => {
                *self.last.lock().unwrap() = records.clone();
                Ok(records)
            }
            Some(Step::Fail) => Err(InventoryError::Timeout(Duration::from_secs(1))),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

/// Reloader that counts invocations and optionally fails.
#[derive(Clone, Default)]
pub struct RecordingReloader {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl RecordingReloader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reloader for RecordingReloader {
    async fn reload(&self) -> Result<ReloadOutput, ReloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ReloadError::Timeout(Duration::from_secs(1)))
        } else {
            Ok(ReloadOutput {
                output: "reloaded\n".to_string(),
            })
        }
    }
}

/// Temp directory holding a template and the rendered output path.
pub struct Workspace {
    pub dir: TempDir,
    pub template: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new(template: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("config.tmpl");
        std::fs::write(&template_path, template).unwrap();
        let output = dir.path().join("config.conf");
        Self {
            dir,
            template: template_path,
            output,
        }
    }

    pub fn config(&self) -> WatcherConfig {
        let mut config = WatcherConfig::default();
        config.template.path = self.template.clone();
        config.template.output = self.output.clone();
        config.sync.period_secs = 1;
        config
    }

    pub fn rendered(&self) -> Option<String> {
        std::fs::read_to_string(&self.output).ok()
    }

    pub fn clear_output(&self) {
        let _ = std::fs::remove_file(&self.output);
    }
}
