use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A project in the build tree, as reported by the daemon's project model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub name: String,
    /// Gradle project path, e.g. `:` or `:app:feature`
    pub path: String,
    pub project_directory: PathBuf,
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
    #[serde(default)]
    pub children: Vec<ProjectNode>,
}

impl ProjectNode {
    pub fn is_root(&self) -> bool {
        self.path == ":"
    }
}

/// A task declared by a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub name: String,
    pub path: String,
    /// Path of the owning project
    pub project_path: String,
    /// `None` and `Some("")` are different groups
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDescriptor {
    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}
