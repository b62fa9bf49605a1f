//! Gradle launcher backed daemon connection

use super::{BuildDaemon, DaemonConnection, ModelRequest};
use crate::config::DaemonConfig;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Init script registering the model export task
const EXPORT_SCRIPT: &str = include_str!("../../assets/export-model.init.gradle");

pub const EXPORT_TASK: &str = "gradleProbeExportModel";
pub const MODEL_PROPERTY: &str = "gradle.probe.model";
pub const OUTPUT_PROPERTY: &str = "gradle.probe.output";

const BUILD_FILES: [&str; 4] = [
    "settings.gradle",
    "settings.gradle.kts",
    "build.gradle",
    "build.gradle.kts",
];

/// Check if a directory is the root of a Gradle build
pub fn is_gradle_project(path: &Path) -> bool {
    BUILD_FILES.iter().any(|file| path.join(file).is_file())
}

fn wrapper_name() -> &'static str {
    if cfg!(windows) { "gradlew.bat" } else { "gradlew" }
}

/// Extracts `8.7` from the `Gradle 8.7` line of `gradle --version`
pub fn parse_gradle_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Gradle "))
        .map(|version| version.trim().to_string())
}

/// Reaches the Gradle daemon through the project's wrapper or a `gradle`
/// executable. The daemon itself outlives every connection.
#[derive(Debug, Clone, Default)]
pub struct GradleDaemon {
    config: DaemonConfig,
}

impl GradleDaemon {
    pub fn new(config: DaemonConfig) -> Self {
        Self { config }
    }

    /// Launcher for `root`: configured executable, then the project wrapper,
    /// then `gradle` on `PATH`
    pub fn resolve_launcher(&self, root: &Path) -> Option<PathBuf> {
        if let Some(exe) = &self.config.executable {
            if exe.components().count() == 1 {
                return which::which(exe).ok();
            }
            return exe.is_file().then(|| exe.clone());
        }

        let wrapper = root.join(wrapper_name());
        if wrapper.is_file() {
            return Some(wrapper);
        }

        which::which("gradle").ok()
    }
}

impl BuildDaemon for GradleDaemon {
    fn connect(&self, root: &Path) -> Result<Box<dyn DaemonConnection>> {
        if !root.is_dir() {
            return Err(Error::connection(root, "not a directory"));
        }
        if !is_gradle_project(root) {
            return Err(Error::connection(
                root,
                "no settings.gradle(.kts) or build.gradle(.kts) found",
            ));
        }

        let launcher = self.resolve_launcher(root).ok_or_else(|| {
            Error::connection(
                root,
                format!(
                    "no Gradle launcher found (configure daemon.executable, add {} or put gradle on PATH)",
                    wrapper_name()
                ),
            )
        })?;
        debug!("Using Gradle launcher {}", launcher.display());

        let mut export_script = tempfile::Builder::new()
            .prefix("gradle-probe-export")
            .suffix(".gradle")
            .tempfile()?;
        export_script.write_all(EXPORT_SCRIPT.as_bytes())?;
        export_script.flush()?;

        let mut connection = GradleConnection {
            root: root.to_path_buf(),
            launcher,
            config: self.config.clone(),
            export_script: Some(export_script),
            gradle_version: None,
        };
        connection.handshake()?;
        Ok(Box::new(connection))
    }

    fn name(&self) -> &'static str {
        "gradle"
    }
}

struct GradleConnection {
    root: PathBuf,
    launcher: PathBuf,
    config: DaemonConfig,
    export_script: Option<NamedTempFile>,
    gradle_version: Option<String>,
}

impl GradleConnection {
    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.launcher);
        cmd.current_dir(&self.root)
            .arg("--daemon")
            .arg("--console=plain")
            .stdin(Stdio::null());

        if self.config.offline {
            cmd.arg("--offline");
        }
        cmd.args(&self.config.args);

        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }
        if let Some(ref java_home) = self.config.java_home {
            cmd.env("JAVA_HOME", java_home);
        }

        cmd
    }

    fn launch(&self, mut cmd: Command) -> Result<Output> {
        debug!("Running: {:?}", cmd);
        cmd.output().map_err(|e| {
            Error::connection(
                &self.root,
                format!("failed to launch {}: {e}", self.launcher.display()),
            )
        })
    }

    fn handshake(&mut self) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.arg("--version");
        let output = self.launch(cmd)?;

        if !output.status.success() {
            return Err(Error::connection(
                &self.root,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        self.gradle_version = parse_gradle_version(&String::from_utf8_lossy(&output.stdout));
        info!(
            "Connected to Gradle {} for {}",
            self.gradle_version.as_deref().unwrap_or("(unknown version)"),
            self.root.display()
        );
        Ok(())
    }

    fn export_script_path(&self) -> Result<&Path> {
        self.export_script
            .as_ref()
            .map(|script| script.path())
            .ok_or_else(|| Error::connection(&self.root, "connection is closed"))
    }
}

impl DaemonConnection for GradleConnection {
    fn fetch_model(&mut self, request: &ModelRequest) -> Result<serde_json::Value> {
        let model = request.kind.name();
        let output_file = tempfile::Builder::new()
            .prefix("gradle-probe-model")
            .suffix(".json")
            .tempfile()?;

        let mut cmd = self.base_command();
        cmd.arg("--quiet")
            .arg("--init-script")
            .arg(self.export_script_path()?);
        for script in &request.init_scripts {
            cmd.arg("--init-script").arg(script);
        }
        cmd.arg(format!("-P{MODEL_PROPERTY}={model}"))
            .arg(format!("-P{OUTPUT_PROPERTY}={}", output_file.path().display()))
            .arg(EXPORT_TASK);

        let output = self.launch(cmd)?;
        if !output.status.success() {
            return Err(Error::remote_build(
                model,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let contents = std::fs::read_to_string(output_file.path())?;
        if contents.trim().is_empty() {
            return Err(Error::remote_build(model, "the daemon did not write the model"));
        }
        serde_json::from_str(&contents)
            .map_err(|e| Error::remote_build(model, format!("malformed model: {e}")))
    }

    fn run_tasks(&mut self, tasks: &[String], error_sink: &mut dyn Write) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.args(tasks);
        let output = self.launch(cmd)?;

        debug!("{}", String::from_utf8_lossy(&output.stdout));
        error_sink.write_all(&output.stderr)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::TaskExecutionFailure {
                tasks: tasks.to_vec(),
                exit_code: output.status.code(),
            })
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(script) = self.export_script.take() {
            script.close()?;
        }
        debug!("Released connection to {}", self.root.display());
        Ok(())
    }
}
