use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a dependency edge points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DependencyKind {
    #[serde(rename = "library")]
    LibraryArtifact { file: PathBuf },
    #[serde(rename = "module")]
    ModuleReference {
        #[serde(rename = "targetModuleName")]
        target: String,
    },
}

/// A directed dependency from `owner` to the target described by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub owner: String,
    pub scope: String,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    pub fn library(owner: &str, scope: &str, file: impl Into<PathBuf>) -> Self {
        Self {
            owner: owner.to_string(),
            scope: scope.to_string(),
            kind: DependencyKind::LibraryArtifact { file: file.into() },
        }
    }

    pub fn module(owner: &str, scope: &str, target: &str) -> Self {
        Self {
            owner: owner.to_string(),
            scope: scope.to_string(),
            kind: DependencyKind::ModuleReference {
                target: target.to_string(),
            },
        }
    }

    pub fn target_module(&self) -> Option<&str> {
        match &self.kind {
            DependencyKind::ModuleReference { target } => Some(target),
            DependencyKind::LibraryArtifact { .. } => None,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DependencyKind::LibraryArtifact { file } => {
                write!(f, "{} -> library {} ({})", self.owner, file.display(), self.scope)
            }
            DependencyKind::ModuleReference { target } => {
                write!(f, "{} -> module {} ({})", self.owner, target, self.scope)
            }
        }
    }
}

/// Wire shape of a single dependency inside the module model
#[derive(Debug, Clone, Deserialize)]
struct ModuleDependency {
    #[serde(default)]
    scope: String,
    #[serde(flatten)]
    kind: DependencyKind,
}

/// One module of the module model
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleModel {
    pub name: String,
    #[serde(default, rename = "dependencies")]
    raw_dependencies: Vec<ModuleDependency>,
    /// Directories holding the module's compiled classes
    #[serde(default)]
    pub output_dirs: Vec<PathBuf>,
}

impl ModuleModel {
    /// Dependency edges owned by this module, in model order
    pub fn dependencies(&self) -> Vec<DependencyEdge> {
        self.raw_dependencies
            .iter()
            .map(|dep| DependencyEdge {
                owner: self.name.clone(),
                scope: dep.scope.clone(),
                kind: dep.kind.clone(),
            })
            .collect()
    }
}

/// The module graph of a whole build (IDE-style project model)
#[derive(Debug, Clone, Deserialize)]
pub struct IdeaProjectModel {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<ModuleModel>,
}

impl IdeaProjectModel {
    pub fn module(&self, name: &str) -> Option<&ModuleModel> {
        self.modules.iter().find(|module| module.name == name)
    }
}
