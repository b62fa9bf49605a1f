pub mod dependency;
pub mod plugin;
pub mod project;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a class was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassSource {
    Archive(PathBuf),
    Module(String),
}

impl fmt::Display for ClassSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassSource::Archive(path) => write!(f, "{}", path.display()),
            ClassSource::Module(name) => write!(f, "module {name}"),
        }
    }
}

// Re-export commonly used types
pub use dependency::{DependencyEdge, DependencyKind, IdeaProjectModel, ModuleModel};
pub use plugin::{ALL_PLUGIN_JARS_KEY, PluginApplicationMap};
pub use project::{ProjectNode, TaskDescriptor};
