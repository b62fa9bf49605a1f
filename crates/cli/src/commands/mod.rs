pub mod archive;
pub mod bootstrap;
pub mod diagnose;
pub mod models;
pub mod plugins;

pub use archive::{classes_command, locate_command};
pub use bootstrap::bootstrap_command;
pub use diagnose::diagnose_command;
pub use models::{deps_command, graph_command, projects_command, tasks_command};
pub use plugins::{plugins_command, which_plugin_command};

use anyhow::{Context as _, Result};
use gradle_probe_core::{Config, ProjectInspector};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Resolved project root and configuration shared by every command
pub struct Context {
    pub root: PathBuf,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let root = match &args.project {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let root = std::path::absolute(&root)
            .with_context(|| format!("Invalid project directory {}", root.display()))?;

        let mut config = Config::load(&root, args.config.as_deref()).with_context(|| {
            match &args.config {
                Some(path) => format!("Failed to load config {}", path.display()),
                None => "Failed to load config".to_string(),
            }
        })?;
        if let Some(gradle) = &args.gradle {
            config.daemon.executable = Some(gradle.clone());
        }
        if args.offline {
            config.daemon.offline = true;
        }
        debug!("Project root: {}", root.display());

        Ok(Self {
            root,
            config,
            json: args.json,
        })
    }

    pub fn inspector(&self) -> ProjectInspector {
        ProjectInspector::from_config(&self.config)
    }
}
