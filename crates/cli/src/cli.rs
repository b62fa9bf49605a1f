use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    Context, bootstrap_command, classes_command, deps_command, diagnose_command, graph_command,
    locate_command, plugins_command, projects_command, tasks_command, which_plugin_command,
};

#[derive(Parser, Debug)]
#[command(name = "gradle-probe")]
#[command(version, about, long_about = None, propagate_version = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug                  Enable debug logging\n    GRADLE_PROBE_GRADLE             Gradle launcher to use\n    GRADLE_PROBE_EXTENSION_PATH     Extra directories searched for extension archives")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Root directory of the Gradle build (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of the nearest .gradle-probe.json
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gradle launcher to use instead of the project's wrapper
    #[arg(long, global = true)]
    pub gradle: Option<PathBuf>,

    /// Run Gradle with --offline
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks of the root project and its direct subprojects
    #[command(visible_alias = "t")]
    Tasks {
        /// Only tasks whose group is exactly this label
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List the root project and its direct subprojects
    Projects,
    /// List dependency edges of one module, or of every module
    Deps {
        /// Module name as reported by the module model
        module: Option<String>,

        /// Print the de-duplicated set of edges across all modules
        #[arg(long, conflicts_with = "module")]
        all: bool,
    },
    /// Print which modules each module depends on
    Graph,
    /// List plugins applied to a module
    Plugins {
        module: String,
    },
    /// Find the plugin archive declaring a plugin id
    WhichPlugin {
        plugin_id: String,
    },
    /// Run a task and print its failure report, or "no-errors"
    #[command(visible_alias = "d")]
    Diagnose {
        task: String,

        /// Print only the "What went wrong" summary
        #[arg(short, long)]
        summary: bool,
    },
    /// Find the archive or module defining a class
    #[command(visible_alias = "l")]
    Locate {
        /// Fully-qualified class name, e.g. com.google.common.collect.ImmutableList
        class_name: String,
    },
    /// List classes packaged in a jar
    Classes {
        archive: PathBuf,
    },
    /// Render the bootstrap init script for the plugin model
    Bootstrap {
        /// Write the script to a temporary file that is kept, and print its path
        #[arg(short, long)]
        keep: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ctx = Context::load(&self.global)?;
        match self.command {
            Commands::Tasks { group } => tasks_command(&ctx, group.as_deref()),
            Commands::Projects => projects_command(&ctx),
            Commands::Deps { module, all } => deps_command(&ctx, module.as_deref(), all),
            Commands::Graph => graph_command(&ctx),
            Commands::Plugins { module } => plugins_command(&ctx, &module),
            Commands::WhichPlugin { plugin_id } => which_plugin_command(&ctx, &plugin_id),
            Commands::Diagnose { task, summary } => diagnose_command(&ctx, &task, summary),
            Commands::Locate { class_name } => locate_command(&ctx, &class_name),
            Commands::Classes { archive } => classes_command(&ctx, &archive),
            Commands::Bootstrap { keep } => bootstrap_command(&ctx, keep),
        }
    }
}
