//! Bootstrap init scripts that inject the plugin-map model into the daemon
//!
//! The daemon cannot compute the plugin-map model on its own. An init script
//! puts the archives implementing the model on its classpath and registers the
//! model builder. The archive locations are resolved here, from configuration,
//! before any daemon call is made:
//!
//! - a pinned archive per role (`plugin_jar`, `model_jar`, `custom_jar`), or
//! - a search of the extension classpath for the archive holding the role's class.

use crate::archive::{ArchiveClassIndex, class_file_path};
use crate::config::ExtensionConfig;
use crate::daemon::ModelKind;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Built-in bootstrap template
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/plugin-model.init.gradle");

/// The three extension classes the injected model depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionRole {
    /// Model interface the client asks for
    PluginInterface,
    /// Serializable model implementation
    ModelImplementation,
    /// Builder computing the model inside the daemon
    CustomModel,
}

impl ExtensionRole {
    pub const ALL: [ExtensionRole; 3] = [
        ExtensionRole::PluginInterface,
        ExtensionRole::ModelImplementation,
        ExtensionRole::CustomModel,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ExtensionRole::PluginInterface => "%%PLUGIN_JAR%%",
            ExtensionRole::ModelImplementation => "%%MODEL_JAR%%",
            ExtensionRole::CustomModel => "%%CUSTOM_JAR%%",
        }
    }

    fn class_name(self, config: &ExtensionConfig) -> &str {
        match self {
            ExtensionRole::PluginInterface => &config.interface_class,
            ExtensionRole::ModelImplementation => &config.model_class,
            ExtensionRole::CustomModel => &config.builder_class,
        }
    }

    fn pinned(self, config: &ExtensionConfig) -> Option<&Path> {
        match self {
            ExtensionRole::PluginInterface => config.plugin_jar.as_deref(),
            ExtensionRole::ModelImplementation => config.model_jar.as_deref(),
            ExtensionRole::CustomModel => config.custom_jar.as_deref(),
        }
    }
}

/// Resolved archive per extension role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionArchives {
    pub plugin_jar: PathBuf,
    pub model_jar: PathBuf,
    pub custom_jar: PathBuf,
}

impl ExtensionArchives {
    pub fn get(&self, role: ExtensionRole) -> &Path {
        match role {
            ExtensionRole::PluginInterface => &self.plugin_jar,
            ExtensionRole::ModelImplementation => &self.model_jar,
            ExtensionRole::CustomModel => &self.custom_jar,
        }
    }
}

/// Finds the archive a class was packaged in
#[derive(Debug, Clone, Default)]
pub struct ExtensionLocator {
    classpath: Vec<PathBuf>,
}

impl ExtensionLocator {
    pub fn new(classpath: Vec<PathBuf>) -> Self {
        Self { classpath }
    }

    /// Configured classpath followed by the install's `lib` directory
    pub fn from_config(config: &ExtensionConfig) -> Self {
        let mut classpath = config.classpath.clone();
        if let Some(lib_dir) = install_lib_dir() {
            classpath.push(lib_dir);
        }
        Self::new(classpath)
    }

    /// Absolute path of the archive holding `class_name`.
    ///
    /// A class reachable only as a loose `.class` file is an error: an exploded
    /// directory cannot be substituted for an archive.
    pub fn locate(
        &self,
        class_name: &str,
        pinned: Option<&Path>,
        index: &mut ArchiveClassIndex,
    ) -> Result<PathBuf> {
        if let Some(path) = pinned {
            return pinned_archive(class_name, path);
        }

        let class_file = class_file_path(class_name);
        for entry in &self.classpath {
            if entry.is_dir() {
                if entry.join(&class_file).is_file() {
                    return Err(Error::extension(
                        class_name,
                        format!(
                            "found in exploded directory {}, an archive is required",
                            entry.display()
                        ),
                    ));
                }
                for archive in archives_in(entry)? {
                    if index.contains(&archive, class_name) {
                        return absolute(class_name, &archive);
                    }
                }
            } else if entry.is_file() && index.contains(entry, class_name) {
                return absolute(class_name, entry);
            }
        }

        Err(Error::extension(
            class_name,
            format!("not found on extension classpath {:?}", self.classpath),
        ))
    }
}

fn install_lib_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let lib_dir = exe.parent()?.parent()?.join("lib");
    lib_dir.is_dir().then_some(lib_dir)
}

fn pinned_archive(class_name: &str, path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        return Err(Error::extension(
            class_name,
            format!(
                "{} is a directory, an archive is required",
                path.display()
            ),
        ));
    }
    if !path.is_file() {
        return Err(Error::extension(
            class_name,
            format!("{} does not exist", path.display()),
        ));
    }
    absolute(class_name, path)
}

fn absolute(class_name: &str, path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::extension(class_name, e.to_string()))
}

/// Jar files directly inside `dir`, sorted by name
fn archives_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jar") {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Substitutes every role token with its archive path using `/` separators
pub fn render(template: &str, archives: &ExtensionArchives) -> String {
    ExtensionRole::ALL
        .iter()
        .fold(template.to_string(), |text, role| {
            text.replace(role.token(), &normalize_separators(archives.get(*role)))
        })
}

/// Gradle scripts want forward slashes on every host
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// A rendered bootstrap script on disk. The file is removed on drop.
#[derive(Debug)]
pub struct BootstrapScript {
    file: NamedTempFile,
}

impl BootstrapScript {
    pub fn write(contents: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("init")
            .suffix(".gradle")
            .tempfile()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Keep the script on disk past this handle
    pub fn persist(self) -> Result<PathBuf> {
        let (_, path) = self.file.keep().map_err(|e| Error::IoError(e.error))?;
        Ok(path)
    }
}

/// Synthesizes the init script that registers the plugin-map model
#[derive(Debug, Clone)]
pub struct ExtensionBootstrapBuilder {
    config: ExtensionConfig,
    locator: ExtensionLocator,
}

impl ExtensionBootstrapBuilder {
    pub fn new(config: ExtensionConfig) -> Self {
        let locator = ExtensionLocator::from_config(&config);
        Self { config, locator }
    }

    pub fn with_locator(config: ExtensionConfig, locator: ExtensionLocator) -> Self {
        Self { config, locator }
    }

    /// Model the injected script teaches the daemon to build
    pub fn model_kind(&self) -> ModelKind {
        ModelKind::Custom(self.config.model_name.clone())
    }

    pub fn resolve_archives(&self) -> Result<ExtensionArchives> {
        let mut index = ArchiveClassIndex::new();
        let mut locate = |role: ExtensionRole| {
            let path = self.locator.locate(
                role.class_name(&self.config),
                role.pinned(&self.config),
                &mut index,
            )?;
            debug!("{} resolved to {}", role.token(), path.display());
            Ok::<_, Error>(path)
        };

        Ok(ExtensionArchives {
            plugin_jar: locate(ExtensionRole::PluginInterface)?,
            model_jar: locate(ExtensionRole::ModelImplementation)?,
            custom_jar: locate(ExtensionRole::CustomModel)?,
        })
    }

    pub fn load_template(&self) -> Result<String> {
        match &self.config.template {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to read bootstrap template {}: {e}",
                    path.display()
                ))
            }),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }

    /// Rendered script text
    pub fn render_script(&self) -> Result<String> {
        let archives = self.resolve_archives()?;
        Ok(render(&self.load_template()?, &archives))
    }

    /// Rendered script written to a fresh temporary file
    pub fn build(&self) -> Result<BootstrapScript> {
        let script = BootstrapScript::write(&self.render_script()?)?;
        debug!("Wrote bootstrap script {}", script.path().display());
        Ok(script)
    }
}
