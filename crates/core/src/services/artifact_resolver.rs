//! Finds which archive or module of a build defines a class

use crate::archive::{ArchiveClassIndex, ArchiveIndexer, class_file_path};
use crate::connection::Session;
use crate::error::Result;
use crate::services::model_query::ModelQueryService;
use crate::types::{ClassSource, DependencyKind, IdeaProjectModel};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Searches a build's dependency archives, module outputs and plugin
/// archives for a class.
///
/// The index is rebuilt for every lookup. The first match wins and the scan
/// order across modules is not part of the contract.
pub struct ArtifactResolver<'a> {
    queries: &'a ModelQueryService,
}

impl<'a> ArtifactResolver<'a> {
    pub fn new(queries: &'a ModelQueryService) -> Self {
        Self { queries }
    }

    /// Where `class_name` is defined, `None` when no archive or module has it.
    ///
    /// The bootstrap script is built before the first model fetch, so broken
    /// extension settings fail with `ExtensionResolutionError` without reaching
    /// the daemon. The plugin map itself is only fetched when libraries and
    /// modules miss.
    pub fn find_defining_archive(
        &self,
        session: &mut Session,
        class_name: &str,
    ) -> Result<Option<ClassSource>> {
        let script = self.queries.bootstrap().build()?;
        let mut index = ArchiveClassIndex::new();

        let model = self.queries.idea_model(session)?;
        if let Some(found) = search_modules(&model, class_name, &mut index) {
            return Ok(Some(found));
        }

        let plugins = self.queries.fetch_plugin_map(session, &script)?;
        for archive in plugins.plugin_archives() {
            if index.contains(&archive, class_name) {
                debug!("{} found in plugin archive {}", class_name, archive.display());
                return Ok(Some(ClassSource::Archive(archive)));
            }
        }

        debug!(
            "{} not found after indexing {} archives",
            class_name,
            index.indexed_count()
        );
        Ok(None)
    }

    /// The plugin archive declaring `plugin_id`, if any
    pub fn find_plugin_archive(
        &self,
        session: &mut Session,
        plugin_id: &str,
    ) -> Result<Option<PathBuf>> {
        let plugins = self.queries.plugin_application_map(session)?;
        for archive in plugins.plugin_archives() {
            match ArchiveIndexer::plugin_ids_of(&archive) {
                Ok(ids) if ids.contains(plugin_id) => return Ok(Some(archive)),
                Ok(_) => {}
                Err(e) => warn!("Skipping archive: {}", e),
            }
        }
        Ok(None)
    }
}

fn search_modules(
    model: &IdeaProjectModel,
    class_name: &str,
    index: &mut ArchiveClassIndex,
) -> Option<ClassSource> {
    let class_file = class_file_path(class_name);

    for module in &model.modules {
        for edge in module.dependencies() {
            match edge.kind {
                DependencyKind::LibraryArtifact { file } => {
                    if index.contains(&file, class_name) {
                        debug!("{} found in {} (via {})", class_name, file.display(), module.name);
                        return Some(ClassSource::Archive(file));
                    }
                }
                DependencyKind::ModuleReference { target } => {
                    let compiled = model.module(&target).is_some_and(|found| {
                        found
                            .output_dirs
                            .iter()
                            .any(|dir| dir.join(&class_file).is_file())
                    });
                    if compiled {
                        debug!("{} found in module {}", class_name, target);
                        return Some(ClassSource::Module(target));
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{ExtensionBootstrapBuilder, ExtensionLocator};
    use crate::connection::ConnectionManager;
    use crate::error::Error;
    use crate::daemon::{FakeBuild, FakeDaemon, ModelKind};
    use crate::test_support::{self, write_class_jar, write_jar};
    use std::path::Path;
    use tempfile::TempDir;

    struct Build {
        temp_dir: TempDir,
        root: PathBuf,
        lib_x: PathBuf,
        plugin_jar: PathBuf,
        queries: ModelQueryService,
        daemon: FakeDaemon,
    }

    impl Build {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path().join("sample");
            let core_output = root.join("core/build/classes/java/main");
            std::fs::create_dir_all(core_output.join("com/example/core")).unwrap();
            std::fs::write(core_output.join("com/example/core/Engine.class"), b"").unwrap();

            let lib_x = write_class_jar(
                &temp_dir.path().join("libX.jar"),
                &["com.x.Y", "com.x.Z"],
            );
            let plugin_jar = write_jar(
                &temp_dir.path().join("greeting-plugin.jar"),
                &[
                    "META-INF/gradle-plugins/com.example.greeting.properties",
                    "com/example/greeting/GreetingPlugin.class",
                ],
            );

            let config = test_support::extension_config(temp_dir.path());
            let queries = ModelQueryService::new(ExtensionBootstrapBuilder::new(config));
            let build = FakeBuild::new()
                .with_model(
                    &ModelKind::IdeaProject,
                    test_support::idea_model(&lib_x, &core_output),
                )
                .with_model(
                    &queries.bootstrap().model_kind(),
                    test_support::plugin_model(&[
                        Path::new("/missing/plugin.jar"),
                        plugin_jar.as_path(),
                    ]),
                );
            let daemon = FakeDaemon::new().with_project(&root, build);

            Self {
                temp_dir,
                root,
                lib_x,
                plugin_jar,
                queries,
                daemon,
            }
        }

        fn find(&self, class_name: &str) -> Option<ClassSource> {
            let manager = ConnectionManager::new(Box::new(self.daemon.clone()));
            manager
                .with_session(&self.root, |session| {
                    ArtifactResolver::new(&self.queries).find_defining_archive(session, class_name)
                })
                .unwrap()
        }
    }

    #[test]
    fn test_library_edge_match() {
        let build = Build::new();
        assert_eq!(build.find("com.x.Y"), Some(ClassSource::Archive(build.lib_x.clone())));
        // libraries matched before the plugin map was needed
        assert!(build.daemon.requests().iter().all(|r| r.kind == ModelKind::IdeaProject));
    }

    #[test]
    fn test_module_reference_reports_module_name() {
        let build = Build::new();
        assert_eq!(
            build.find("com.example.core.Engine"),
            Some(ClassSource::Module("core".to_string()))
        );
    }

    #[test]
    fn test_plugin_archive_match_skips_unreadable() {
        let build = Build::new();
        assert_eq!(
            build.find("com.example.greeting.GreetingPlugin"),
            Some(ClassSource::Archive(build.plugin_jar.clone()))
        );
    }

    #[test]
    fn test_absent_class() {
        let build = Build::new();
        assert_eq!(build.find("does.not.Exist"), None);
    }

    #[test]
    fn test_class_in_several_archives_matches_one_of_them() {
        let build = Build::new();
        let duplicate = write_class_jar(&build.temp_dir.path().join("dup.jar"), &["com.x.Y"]);
        let queries = &build.queries;
        let daemon = FakeDaemon::new().with_project(
            &build.root,
            FakeBuild::new()
                .with_model(
                    &ModelKind::IdeaProject,
                    serde_json::json!({"name": "sample", "modules": [
                        {"name": "a", "dependencies": [
                            {"kind": "library", "file": duplicate, "scope": "COMPILE"},
                            {"kind": "library", "file": build.lib_x, "scope": "COMPILE"}
                        ]}
                    ]}),
                )
                .with_model(&queries.bootstrap().model_kind(), test_support::plugin_model(&[])),
        );
        let manager = ConnectionManager::new(Box::new(daemon));

        let found = manager
            .with_session(&build.root, |session| {
                ArtifactResolver::new(queries).find_defining_archive(session, "com.x.Y")
            })
            .unwrap();
        let candidates = [
            ClassSource::Archive(duplicate.clone()),
            ClassSource::Archive(build.lib_x.clone()),
        ];
        assert!(found.is_some_and(|source| candidates.contains(&source)));
    }

    #[test]
    fn test_unresolvable_extension_fails_before_any_model_fetch() {
        let build = Build::new();
        let queries = ModelQueryService::new(ExtensionBootstrapBuilder::with_locator(
            Default::default(),
            ExtensionLocator::new(Vec::new()),
        ));
        let manager = ConnectionManager::new(Box::new(build.daemon.clone()));
        let mut session = manager.open(&build.root).unwrap();
        let resolver = ArtifactResolver::new(&queries);

        // a class sitting in a library still fails on broken extension settings
        for class_name in ["com.x.Y", "does.not.Exist"] {
            let err = resolver
                .find_defining_archive(&mut session, class_name)
                .unwrap_err();
            assert!(matches!(err, Error::ExtensionResolutionError { .. }));
        }
        assert!(build.daemon.requests().is_empty());
    }

    #[test]
    fn test_find_plugin_archive() {
        let build = Build::new();
        let manager = ConnectionManager::new(Box::new(build.daemon.clone()));
        let mut session = manager.open(&build.root).unwrap();
        let resolver = ArtifactResolver::new(&build.queries);

        assert_eq!(
            resolver
                .find_plugin_archive(&mut session, "com.example.greeting")
                .unwrap(),
            Some(build.plugin_jar.clone())
        );
        assert_eq!(
            resolver.find_plugin_archive(&mut session, "application").unwrap(),
            None
        );
    }
}
