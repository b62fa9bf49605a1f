use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Reserved key of the plugin map holding every plugin archive of the build
pub const ALL_PLUGIN_JARS_KEY: &str = "all_plugin_jars_path";

/// Plugins applied to each module, as computed by the injected extension model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginApplicationMap {
    #[serde(default)]
    project_to_plugin_mapping: BTreeMap<String, BTreeSet<String>>,
}

impl PluginApplicationMap {
    /// Plugin ids applied to `module`, `None` when the module key is absent.
    ///
    /// An absent key does not tell whether the module exists: a module that
    /// applies no plugin and a module that is not part of the build look the same.
    pub fn plugins_for(&self, module: &str) -> Option<&BTreeSet<String>> {
        if module == ALL_PLUGIN_JARS_KEY {
            return None;
        }
        self.project_to_plugin_mapping.get(module)
    }

    /// Every plugin archive applied anywhere in the build
    pub fn plugin_archives(&self) -> Vec<PathBuf> {
        self.project_to_plugin_mapping
            .get(ALL_PLUGIN_JARS_KEY)
            .map(|paths| paths.iter().map(PathBuf::from).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PluginApplicationMap {
        serde_json::from_str(
            r#"{"projectToPluginMapping": {
                "app": ["com.android.application", "kotlin-android", "kotlin-android"],
                "core": [],
                "all_plugin_jars_path": ["/cache/agp.jar", "/cache/kgp.jar"]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_plugins_for_module() {
        let map = sample();
        let app = map.plugins_for("app").unwrap();

        assert_eq!(app.len(), 2);
        assert!(app.contains("kotlin-android"));
        assert!(map.plugins_for("core").unwrap().is_empty());
        assert!(map.plugins_for("missing").is_none());
    }

    #[test]
    fn test_reserved_key_is_not_a_module() {
        let map = sample();

        assert!(map.plugins_for(ALL_PLUGIN_JARS_KEY).is_none());
        assert_eq!(
            map.plugin_archives(),
            vec![PathBuf::from("/cache/agp.jar"), PathBuf::from("/cache/kgp.jar")]
        );
    }

    #[test]
    fn test_missing_aggregate() {
        let map = PluginApplicationMap::default();
        assert!(map.plugin_archives().is_empty());
    }
}
