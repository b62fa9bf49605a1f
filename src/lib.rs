//! A complete sample build on disk, served by a fake daemon
//!
//! Layout under a temporary directory:
//!
//! ```text
//! lib/                     extension archives (probe-model-api.jar, probe-model-impl.jar)
//! repo/libX.jar            library of module `core`
//! repo/greeting-plugin.jar plugin `com.example.greeting`
//! sample/                  the build root
//! sample/core/build/classes/java/main/com/example/core/Engine.class
//! ```

use gradle_probe_core::bootstrap::ExtensionBootstrapBuilder;
use gradle_probe_core::config::{Config, ExtensionConfig};
use gradle_probe_core::daemon::{FakeBuild, FakeDaemon, FakeTask, ModelKind};
use gradle_probe_core::test_support;
use gradle_probe_core::ProjectInspector;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const COMPILE_FAILURE: &str = "\nFAILURE: Build failed with an exception.\n\n\
* What went wrong:\n\
Execution failed for task ':app:compileJava'.\n\
> Compilation failed; see the compiler error output for details.\n\n\
* Try:\n\
> Run with --info option to get more log output.\n";

pub struct SampleBuild {
    temp_dir: TempDir,
    pub root: PathBuf,
    pub lib_x: PathBuf,
    pub plugin_jar: PathBuf,
    pub extensions: ExtensionConfig,
    pub daemon: FakeDaemon,
}

impl SampleBuild {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("sample");
        let repo = temp_dir.path().join("repo");
        std::fs::create_dir_all(&repo).unwrap();

        let core_output = root.join("core/build/classes/java/main");
        let engine = core_output.join("com/example/core/Engine.class");
        std::fs::create_dir_all(engine.parent().unwrap()).unwrap();
        std::fs::write(&engine, b"\xCA\xFE\xBA\xBE").unwrap();

        let lib_x = test_support::write_class_jar(
            &repo.join("libX.jar"),
            &["com.x.Y", "com.x.Y$Builder", "com.x.internal.Z"],
        );
        let plugin_jar = test_support::write_jar(
            &repo.join("greeting-plugin.jar"),
            &[
                "META-INF/gradle-plugins/com.example.greeting.properties",
                "com/example/greeting/GreetingPlugin.class",
                "com/example/greeting/GreetingTask.class",
            ],
        );
        let extensions = test_support::extension_config(temp_dir.path());

        let plugin_model_kind = ExtensionBootstrapBuilder::new(extensions.clone()).model_kind();
        let build = FakeBuild::new()
            .with_model(&ModelKind::GradleProject, test_support::project_model(&root))
            .with_model(
                &ModelKind::IdeaProject,
                test_support::idea_model(&lib_x, &core_output),
            )
            .with_model(
                &plugin_model_kind,
                test_support::plugin_model(&[plugin_jar.as_path()]),
            )
            .with_task("help", FakeTask::succeeds())
            .with_task("compileJava", FakeTask::fails(COMPILE_FAILURE));
        let daemon = FakeDaemon::new().with_project(&root, build);

        Self {
            temp_dir,
            root,
            lib_x,
            plugin_jar,
            extensions,
            daemon,
        }
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> Config {
        Config {
            extensions: self.extensions.clone(),
            ..Default::default()
        }
    }

    pub fn inspector(&self) -> ProjectInspector {
        ProjectInspector::new(
            Box::new(self.daemon.clone()),
            ExtensionBootstrapBuilder::new(self.extensions.clone()),
        )
    }
}

impl Default for SampleBuild {
    fn default() -> Self {
        Self::new()
    }
}
