//! gradle-probe - Introspect Gradle builds through the Gradle daemon
//!
//! This crate provides functionality to:
//! - Query project trees, tasks and module dependency graphs
//! - Inject a bootstrap init script so the daemon can report applied plugins
//! - Run tasks and capture their failure reports
//! - Find the archive or module that defines a class
pub mod archive;
pub mod bootstrap;
pub mod config;
pub mod connection;
pub mod daemon;
pub mod error;
pub mod inspector;
pub mod services;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use archive::{ArchiveClassIndex, ArchiveIndexer};
pub use bootstrap::{BootstrapScript, ExtensionBootstrapBuilder, ExtensionLocator};
pub use config::Config;
pub use connection::{ConnectionManager, Session};
pub use daemon::{BuildDaemon, DaemonConnection, GradleDaemon, ModelKind, ModelRequest};
pub use inspector::ProjectInspector;
pub use services::{ArtifactResolver, BuildDiagnosticsRunner, ModelQueryService, TaskOutcome};
