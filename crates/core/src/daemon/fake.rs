//! In-memory daemon for tests

use super::{BuildDaemon, DaemonConnection, ModelKind, ModelRequest};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Scripted outcome of running a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeTask {
    Succeeds { stderr: String },
    Fails { stderr: String },
}

impl FakeTask {
    pub fn succeeds() -> Self {
        FakeTask::Succeeds {
            stderr: String::new(),
        }
    }

    pub fn fails(stderr: &str) -> Self {
        FakeTask::Fails {
            stderr: stderr.to_string(),
        }
    }
}

/// Models and tasks one fake project answers with
#[derive(Debug, Clone, Default)]
pub struct FakeBuild {
    models: HashMap<String, serde_json::Value>,
    failing_models: HashMap<String, String>,
    tasks: HashMap<String, FakeTask>,
}

impl FakeBuild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, kind: &ModelKind, model: serde_json::Value) -> Self {
        self.models.insert(kind.name().to_string(), model);
        self
    }

    pub fn with_failing_model(mut self, kind: &ModelKind, message: &str) -> Self {
        self.failing_models
            .insert(kind.name().to_string(), message.to_string());
        self
    }

    pub fn with_task(mut self, name: &str, task: FakeTask) -> Self {
        self.tasks.insert(name.to_string(), task);
        self
    }
}

/// A model request as the fake daemon saw it. Init scripts are captured with
/// their contents because callers may delete them afterwards.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub kind: ModelKind,
    pub init_scripts: Vec<(PathBuf, String)>,
}

#[derive(Debug, Default)]
struct Stats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Daemon double answering from registered `FakeBuild`s
#[derive(Debug, Clone, Default)]
pub struct FakeDaemon {
    projects: Arc<Mutex<HashMap<PathBuf, FakeBuild>>>,
    stats: Arc<Stats>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, root: impl Into<PathBuf>, build: FakeBuild) -> Self {
        locked(&self.projects).insert(root.into(), build);
        self
    }

    pub fn opened(&self) -> usize {
        self.stats.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.stats.closed.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        locked(&self.stats.requests).clone()
    }
}

impl BuildDaemon for FakeDaemon {
    fn connect(&self, root: &Path) -> Result<Box<dyn DaemonConnection>> {
        let build = locked(&self.projects)
            .get(root)
            .cloned()
            .ok_or_else(|| Error::connection(root, "not a Gradle project"))?;
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            build,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeConnection {
    build: FakeBuild,
    stats: Arc<Stats>,
}

impl DaemonConnection for FakeConnection {
    fn fetch_model(&mut self, request: &ModelRequest) -> Result<serde_json::Value> {
        let init_scripts = request
            .init_scripts
            .iter()
            .map(|path| Ok((path.clone(), std::fs::read_to_string(path)?)))
            .collect::<Result<Vec<_>>>()?;
        locked(&self.stats.requests).push(RecordedRequest {
            kind: request.kind.clone(),
            init_scripts,
        });

        let name = request.kind.name();
        if let Some(message) = self.build.failing_models.get(name) {
            return Err(Error::remote_build(name, message.clone()));
        }
        if matches!(request.kind, ModelKind::Custom(_)) && request.init_scripts.is_empty() {
            return Err(Error::remote_build(
                name,
                format!("No builders are available to build a model of type '{name}'"),
            ));
        }
        self.build
            .models
            .get(name)
            .cloned()
            .ok_or_else(|| Error::remote_build(name, "unknown model"))
    }

    fn run_tasks(&mut self, tasks: &[String], error_sink: &mut dyn Write) -> Result<()> {
        for task in tasks {
            match self.build.tasks.get(task) {
                Some(FakeTask::Succeeds { stderr }) => error_sink.write_all(stderr.as_bytes())?,
                Some(FakeTask::Fails { stderr }) => {
                    error_sink.write_all(stderr.as_bytes())?;
                    return Err(Error::TaskExecutionFailure {
                        tasks: tasks.to_vec(),
                        exit_code: Some(1),
                    });
                }
                None => {
                    writeln!(
                        error_sink,
                        "FAILURE: Build failed with an exception.\n\n* What went wrong:\nTask '{task}' not found in root project.\n"
                    )?;
                    return Err(Error::TaskExecutionFailure {
                        tasks: tasks.to_vec(),
                        exit_code: Some(1),
                    });
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
