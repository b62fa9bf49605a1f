//! One-call-per-question API over a project root
//!
//! Every method opens its own session, issues its queries and releases the
//! session before returning. Nothing is cached between calls.

use crate::bootstrap::ExtensionBootstrapBuilder;
use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::daemon::{BuildDaemon, GradleDaemon};
use crate::error::Result;
use crate::services::{ArtifactResolver, BuildDiagnosticsRunner, ModelQueryService, TaskOutcome};
use crate::types::{ClassSource, DependencyEdge, ProjectNode, TaskDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub struct ProjectInspector {
    connections: ConnectionManager,
    queries: ModelQueryService,
    diagnostics: BuildDiagnosticsRunner,
}

impl ProjectInspector {
    pub fn new(daemon: Box<dyn BuildDaemon>, bootstrap: ExtensionBootstrapBuilder) -> Self {
        Self {
            connections: ConnectionManager::new(daemon),
            queries: ModelQueryService::new(bootstrap),
            diagnostics: BuildDiagnosticsRunner::new(),
        }
    }

    /// Inspector backed by the Gradle launcher
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(GradleDaemon::new(config.daemon.clone())),
            ExtensionBootstrapBuilder::new(config.extensions.clone()),
        )
    }

    pub fn bootstrap(&self) -> &ExtensionBootstrapBuilder {
        self.queries.bootstrap()
    }

    pub fn list_tasks(&self, root: &Path, group: Option<&str>) -> Result<Vec<TaskDescriptor>> {
        self.connections
            .with_session(root, |session| self.queries.list_tasks(session, group))
    }

    pub fn list_projects(&self, root: &Path) -> Result<Vec<ProjectNode>> {
        self.connections
            .with_session(root, |session| self.queries.list_projects(session))
    }

    pub fn list_module_dependencies(&self, root: &Path, module: &str) -> Result<Vec<DependencyEdge>> {
        self.connections.with_session(root, |session| {
            self.queries.list_module_dependencies(session, module)
        })
    }

    pub fn list_all_module_dependencies(
        &self,
        root: &Path,
    ) -> Result<Vec<(String, Vec<DependencyEdge>)>> {
        self.connections
            .with_session(root, |session| self.queries.list_all_module_dependencies(session))
    }

    pub fn get_all_dependencies(&self, root: &Path) -> Result<BTreeSet<DependencyEdge>> {
        self.connections
            .with_session(root, |session| self.queries.get_all_dependencies(session))
    }

    pub fn module_dependency_graph(&self, root: &Path) -> Result<BTreeMap<String, BTreeSet<String>>> {
        self.connections
            .with_session(root, |session| self.queries.module_dependency_graph(session))
    }

    pub fn list_plugins_for_module(
        &self,
        root: &Path,
        module: &str,
    ) -> Result<Option<BTreeSet<String>>> {
        self.connections.with_session(root, |session| {
            self.queries.list_plugins_for_module(session, module)
        })
    }

    pub fn run_task(&self, root: &Path, task: &str) -> Result<TaskOutcome> {
        self.connections
            .with_session(root, |session| self.diagnostics.run_task(session, task))
    }

    /// Captured failure text of `task`, or `"no-errors"`
    pub fn run_and_capture_failure(&self, root: &Path, task: &str) -> Result<String> {
        Ok(self.run_task(root, task)?.into_report())
    }

    pub fn find_defining_archive(&self, root: &Path, class_name: &str) -> Result<Option<ClassSource>> {
        self.connections.with_session(root, |session| {
            ArtifactResolver::new(&self.queries).find_defining_archive(session, class_name)
        })
    }

    pub fn find_plugin_archive(&self, root: &Path, plugin_id: &str) -> Result<Option<PathBuf>> {
        self.connections.with_session(root, |session| {
            ArtifactResolver::new(&self.queries).find_plugin_archive(session, plugin_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{FakeBuild, FakeDaemon, FakeTask, ModelKind};
    use crate::error::Error;
    use crate::services::NO_ERRORS;
    use crate::test_support;
    use tempfile::TempDir;

    fn inspector(temp_dir: &TempDir) -> (ProjectInspector, FakeDaemon, PathBuf) {
        let root = temp_dir.path().join("sample");
        let build = FakeBuild::new()
            .with_model(&ModelKind::GradleProject, test_support::project_model(&root))
            .with_failing_model(&ModelKind::IdeaProject, "Could not resolve all dependencies")
            .with_task("help", FakeTask::succeeds());
        let daemon = FakeDaemon::new().with_project(&root, build);
        let inspector = ProjectInspector::new(
            Box::new(daemon.clone()),
            ExtensionBootstrapBuilder::new(test_support::extension_config(temp_dir.path())),
        );
        (inspector, daemon, root)
    }

    #[test]
    fn test_every_call_gets_its_own_session() {
        let temp_dir = TempDir::new().unwrap();
        let (inspector, daemon, root) = inspector(&temp_dir);

        assert_eq!(inspector.list_projects(&root).unwrap().len(), 3);
        assert_eq!(inspector.run_and_capture_failure(&root, "help").unwrap(), NO_ERRORS);
        assert!(!inspector.list_tasks(&root, Some("build")).unwrap().is_empty());

        assert_eq!(daemon.opened(), 3);
        assert_eq!(daemon.closed(), 3);
    }

    #[test]
    fn test_remote_failure_still_releases_session() {
        let temp_dir = TempDir::new().unwrap();
        let (inspector, daemon, root) = inspector(&temp_dir);

        let err = inspector.get_all_dependencies(&root).unwrap_err();
        assert!(matches!(err, Error::RemoteBuildError { ref model, .. } if model == "idea"));
        assert_eq!(daemon.opened(), 1);
        assert_eq!(daemon.closed(), 1);
    }

    #[test]
    fn test_unknown_root_is_connection_error() {
        let temp_dir = TempDir::new().unwrap();
        let (inspector, daemon, _root) = inspector(&temp_dir);

        let err = inspector.list_projects(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConnectionError { .. }));
        assert_eq!(daemon.opened(), 0);
    }
}
