//! Boundary to the external build daemon.
//!
//! The daemon is only ever reached through three request shapes: connect to a
//! project root, fetch a model, and run tasks with a captured error stream.

pub mod gradle;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

use crate::error::Result;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use gradle::GradleDaemon;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuild, FakeDaemon, FakeTask};

/// Model types the daemon can be asked for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Project tree with tasks
    GradleProject,
    /// Module graph with dependency edges
    IdeaProject,
    /// Model provided by an injected extension, by model name
    Custom(String),
}

impl ModelKind {
    pub fn name(&self) -> &str {
        match self {
            ModelKind::GradleProject => "project",
            ModelKind::IdeaProject => "idea",
            ModelKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single model fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub kind: ModelKind,
    /// Extra init scripts handed to the daemon
    pub init_scripts: Vec<PathBuf>,
}

impl ModelRequest {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            init_scripts: Vec::new(),
        }
    }

    pub fn with_init_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.init_scripts.push(script.into());
        self
    }
}

/// Starts or reaches a build daemon for a project root
pub trait BuildDaemon: Send + Sync {
    /// Perform the handshake for `root`. Fails with `ConnectionError` when the
    /// root is not a project or the daemon cannot be reached.
    fn connect(&self, root: &Path) -> Result<Box<dyn DaemonConnection>>;

    /// Get the name of this daemon implementation
    fn name(&self) -> &'static str;
}

/// One live handshake with the daemon
pub trait DaemonConnection: Send {
    /// Fetch a model as raw JSON
    fn fetch_model(&mut self, request: &ModelRequest) -> Result<serde_json::Value>;

    /// Run tasks, copying the daemon's error channel into `error_sink`
    fn run_tasks(&mut self, tasks: &[String], error_sink: &mut dyn Write) -> Result<()>;

    /// Release the handshake; called at most once by `Session`
    fn close(&mut self) -> Result<()>;
}
