//! Typed model queries over an open session
//!
//! Standard models (project tree, module graph) are fetched directly. The
//! plugin map is a custom model and needs a bootstrap script injected into the
//! request so the daemon knows how to build it.

use crate::bootstrap::{BootstrapScript, ExtensionBootstrapBuilder};
use crate::connection::Session;
use crate::daemon::{ModelKind, ModelRequest};
use crate::error::{Error, Result};
use crate::types::{
    DependencyEdge, IdeaProjectModel, PluginApplicationMap, ProjectNode, TaskDescriptor,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub struct ModelQueryService {
    bootstrap: ExtensionBootstrapBuilder,
}

impl ModelQueryService {
    pub fn new(bootstrap: ExtensionBootstrapBuilder) -> Self {
        Self { bootstrap }
    }

    pub fn bootstrap(&self) -> &ExtensionBootstrapBuilder {
        &self.bootstrap
    }

    pub fn project_tree(&self, session: &mut Session) -> Result<ProjectNode> {
        session.fetch_model(&ModelRequest::new(ModelKind::GradleProject))
    }

    /// Tasks of the root project followed by those of its immediate children.
    ///
    /// Grandchildren are not visited. `group` must match exactly; a task
    /// without a group never matches.
    pub fn list_tasks(
        &self,
        session: &mut Session,
        group: Option<&str>,
    ) -> Result<Vec<TaskDescriptor>> {
        let root = self.project_tree(session)?;
        let tasks: Vec<TaskDescriptor> = root
            .tasks
            .iter()
            .chain(root.children.iter().flat_map(|child| child.tasks.iter()))
            .filter(|task| group.is_none_or(|group| task.in_group(group)))
            .cloned()
            .collect();
        debug!("Found {} tasks (group filter: {:?})", tasks.len(), group);
        Ok(tasks)
    }

    /// The root project followed by its immediate children.
    ///
    /// Nodes keep their subtrees, so the root entry still owns the whole tree.
    /// Only the listing stops one level down.
    pub fn list_projects(&self, session: &mut Session) -> Result<Vec<ProjectNode>> {
        let root = self.project_tree(session)?;
        let mut projects = root.children.clone();
        projects.insert(0, root);
        Ok(projects)
    }

    pub fn idea_model(&self, session: &mut Session) -> Result<IdeaProjectModel> {
        session.fetch_model(&ModelRequest::new(ModelKind::IdeaProject))
    }

    pub fn list_module_dependencies(
        &self,
        session: &mut Session,
        module: &str,
    ) -> Result<Vec<DependencyEdge>> {
        let model = self.idea_model(session)?;
        model
            .module(module)
            .map(|found| found.dependencies())
            .ok_or_else(|| Error::ModuleNotFoundError(module.to_string()))
    }

    /// Every module with its dependency edges, in model order
    pub fn list_all_module_dependencies(
        &self,
        session: &mut Session,
    ) -> Result<Vec<(String, Vec<DependencyEdge>)>> {
        let model = self.idea_model(session)?;
        Ok(model
            .modules
            .iter()
            .map(|module| (module.name.clone(), module.dependencies()))
            .collect())
    }

    pub fn get_all_dependencies(&self, session: &mut Session) -> Result<BTreeSet<DependencyEdge>> {
        let model = self.idea_model(session)?;
        Ok(model
            .modules
            .iter()
            .flat_map(|module| module.dependencies())
            .collect())
    }

    /// Module → modules it references. Modules without module edges map to
    /// an empty set.
    pub fn module_dependency_graph(
        &self,
        session: &mut Session,
    ) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let model = self.idea_model(session)?;
        Ok(model
            .modules
            .iter()
            .map(|module| {
                let targets = module
                    .dependencies()
                    .iter()
                    .filter_map(|edge| edge.target_module().map(str::to_string))
                    .collect();
                (module.name.clone(), targets)
            })
            .collect())
    }

    /// The raw plugin map, fetched with the bootstrap script injected.
    ///
    /// Fails with `ExtensionResolutionError` before reaching the daemon when
    /// the extension archives cannot be resolved.
    pub fn plugin_application_map(&self, session: &mut Session) -> Result<PluginApplicationMap> {
        let script = self.bootstrap.build()?;
        self.fetch_plugin_map(session, &script)
    }

    /// The plugin map fetched with an already built bootstrap script
    pub fn fetch_plugin_map(
        &self,
        session: &mut Session,
        script: &BootstrapScript,
    ) -> Result<PluginApplicationMap> {
        let request =
            ModelRequest::new(self.bootstrap.model_kind()).with_init_script(script.path());
        session.fetch_model(&request)
    }

    /// Plugin ids applied to `module`.
    ///
    /// `None` covers both a module applying nothing that the model omitted and
    /// a module that does not exist. Callers needing the difference must check
    /// the module list themselves.
    pub fn list_plugins_for_module(
        &self,
        session: &mut Session,
        module: &str,
    ) -> Result<Option<BTreeSet<String>>> {
        let map = self.plugin_application_map(session)?;
        Ok(map.plugins_for(module).cloned())
    }
}
