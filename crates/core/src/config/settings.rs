use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names looked up from the project root upwards
pub const CONFIG_FILE_NAMES: [&str; 2] = [".gradle-probe.json", "gradle-probe.json"];

/// Overrides the Gradle launcher
pub const ENV_GRADLE: &str = "GRADLE_PROBE_GRADLE";
/// Extra extension classpath entries, in the platform's path-list format
pub const ENV_EXTENSION_PATH: &str = "GRADLE_PROBE_EXTENSION_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub extensions: ExtensionConfig,
}

/// How the Gradle launcher is started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DaemonConfig {
    /// Launcher to use instead of the project's wrapper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// Extra arguments passed to every invocation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_home: Option<PathBuf>,
}

/// Where the archives implementing the plugin-map model live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ExtensionConfig {
    /// Archives and directories searched for the extension classes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classpath: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_jar: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_jar: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_jar: Option<PathBuf>,
    /// Bootstrap script template replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Model name the daemon is asked for
    pub model_name: String,
    pub interface_class: String,
    pub model_class: String,
    pub builder_class: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            plugin_jar: None,
            model_jar: None,
            custom_jar: None,
            template: None,
            model_name: "ConfigurationDependenciesModel".to_string(),
            interface_class: "ConfigurationDependenciesModel".to_string(),
            model_class: "DefaultDependenciesModel".to_string(),
            builder_class: "ConfigurationDependenciesModelBuilder".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.resolve_relative_paths(path.parent().unwrap_or(Path::new(".")));
        Ok(config)
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Config for a project: explicit file, else the nearest config file, else
    /// defaults. Environment overrides are applied last.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file(project_root) {
                Some(path) => {
                    tracing::debug!("Using config file {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var_os(key));
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<std::ffi::OsString>,
    {
        if let Some(gradle) = lookup(ENV_GRADLE).filter(|value| !value.is_empty()) {
            self.daemon.executable = Some(PathBuf::from(gradle));
        }
        if let Some(paths) = lookup(ENV_EXTENSION_PATH) {
            self.extensions
                .classpath
                .extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }
    }

    /// Relative paths in a config file are relative to the file's directory
    fn resolve_relative_paths(&mut self, base: &Path) {
        let absolutize = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        let extensions = &mut self.extensions;
        extensions.classpath.iter_mut().for_each(absolutize);
        for path in [
            &mut extensions.plugin_jar,
            &mut extensions.model_jar,
            &mut extensions.custom_jar,
            &mut extensions.template,
        ]
        .into_iter()
        .flatten()
        {
            absolutize(path);
        }
        if let Some(java_home) = self.daemon.java_home.as_mut() {
            absolutize(java_home);
        }
        // bare launcher names like "gradle" are looked up on PATH
        if let Some(exe) = self.daemon.executable.as_mut() {
            if exe.components().count() > 1 {
                absolutize(exe);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.daemon.offline = true;
        config.daemon.args = vec!["--stacktrace".to_string()];
        config.extensions.plugin_jar = Some(PathBuf::from("/opt/probe/lib/model.jar"));

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert!(parsed.daemon.offline);
        assert_eq!(parsed.daemon.args, vec!["--stacktrace".to_string()]);
        assert_eq!(parsed.extensions, config.extensions);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: Config =
            serde_json::from_str(r#"{"extensions": {"classpath": ["/opt/lib"]}}"#).unwrap();

        assert_eq!(parsed.extensions.classpath, vec![PathBuf::from("/opt/lib")]);
        assert_eq!(parsed.extensions.model_name, "ConfigurationDependenciesModel");
        assert_eq!(parsed.extensions.builder_class, "ConfigurationDependenciesModelBuilder");
        assert_eq!(parsed.daemon, DaemonConfig::default());
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("app").join("feature");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join(".gradle-probe.json"), "{}").unwrap();

        let found = Config::find_config_file(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(".gradle-probe.json"));
    }

    #[test]
    fn test_relative_paths_follow_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gradle-probe.json");
        std::fs::write(
            &config_path,
            r#"{
                "daemon": {"executable": "gradle"},
                "extensions": {"classpath": ["lib"], "template": "scripts/init.gradle"}
            }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.extensions.classpath, vec![temp_dir.path().join("lib")]);
        assert_eq!(
            config.extensions.template,
            Some(temp_dir.path().join("scripts/init.gradle"))
        );
        assert_eq!(config.daemon.executable, Some(PathBuf::from("gradle")));
    }

    #[test]
    fn test_invalid_config_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".gradle-probe.json");
        std::fs::write(&config_path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from_file(&config_path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let extension_path = std::env::join_paths(["/opt/a", "/opt/b"]).unwrap();

        config.apply_env_overrides(|key| match key {
            ENV_GRADLE => Some(OsString::from("/usr/local/bin/gradle")),
            ENV_EXTENSION_PATH => Some(extension_path.clone()),
            _ => None,
        });

        assert_eq!(
            config.daemon.executable,
            Some(PathBuf::from("/usr/local/bin/gradle"))
        );
        assert_eq!(
            config.extensions.classpath,
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );
    }
}
