//! Fixtures shared by unit tests and downstream integration tests

use crate::config::ExtensionConfig;
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Writes a jar holding `entries` verbatim
pub fn write_jar(path: &Path, entries: &[&str]) -> PathBuf {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for entry in entries {
        writer.start_file(*entry, options).unwrap();
        writer.write_all(b"\xCA\xFE\xBA\xBE").unwrap();
    }
    writer.finish().unwrap();
    path.to_path_buf()
}

/// Writes a jar holding one class file per fully-qualified name
pub fn write_class_jar(path: &Path, classes: &[&str]) -> PathBuf {
    let entries: Vec<String> = classes
        .iter()
        .map(|class| format!("{}.class", class.replace('.', "/")))
        .collect();
    let entries: Vec<&str> = entries.iter().map(String::as_str).collect();
    write_jar(path, &entries)
}

/// Lays out the three extension classes under `dir/lib` and returns a config
/// searching that directory
pub fn extension_config(dir: &Path) -> ExtensionConfig {
    let lib = dir.join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    write_class_jar(&lib.join("probe-model-api.jar"), &["ConfigurationDependenciesModel"]);
    write_class_jar(
        &lib.join("probe-model-impl.jar"),
        &["DefaultDependenciesModel", "ConfigurationDependenciesModelBuilder"],
    );
    ExtensionConfig {
        classpath: vec![lib],
        ..Default::default()
    }
}

fn task(project: &str, name: &str, group: Option<&str>) -> Value {
    let path = if project == ":" {
        format!(":{name}")
    } else {
        format!("{project}:{name}")
    };
    json!({"name": name, "path": path, "projectPath": project, "group": group})
}

/// Project tree: root with `app` (which has a nested `ui`) and `core`
pub fn project_model(root: &Path) -> Value {
    let dir = |relative: &str| root.join(relative).display().to_string();
    json!({
        "name": "sample",
        "path": ":",
        "projectDirectory": root.display().to_string(),
        "tasks": [
            task(":", "build", Some("build")),
            task(":", "clean", Some("build")),
            task(":", "help", Some("help")),
            task(":", "wrapper", Some("Build Setup")),
            task(":", "internal", None),
            task(":", "blank", Some("")),
        ],
        "children": [
            {
                "name": "app",
                "path": ":app",
                "projectDirectory": dir("app"),
                "tasks": [
                    task(":app", "assemble", Some("build")),
                    task(":app", "lint", Some("verification")),
                ],
                "children": [{
                    "name": "ui",
                    "path": ":app:ui",
                    "projectDirectory": dir("app/ui"),
                    "tasks": [task(":app:ui", "uiTest", Some("verification"))],
                    "children": []
                }]
            },
            {
                "name": "core",
                "path": ":core",
                "projectDirectory": dir("core"),
                "tasks": [
                    task(":core", "compileJava", None),
                    task(":core", "test", Some("verification")),
                ],
                "children": []
            }
        ]
    })
}

/// Module graph: `app` depends on module `core`, `core` on `lib_x`
pub fn idea_model(lib_x: &Path, core_output: &Path) -> Value {
    json!({
        "name": "sample",
        "modules": [
            {"name": "sample", "dependencies": []},
            {"name": "app", "dependencies": [
                {"kind": "module", "targetModuleName": "core", "scope": "COMPILE"}
            ]},
            {"name": "core", "outputDirs": [core_output.display().to_string()], "dependencies": [
                {"kind": "library", "file": lib_x.display().to_string(), "scope": "COMPILE"},
                {"kind": "library", "file": lib_x.display().to_string(), "scope": "RUNTIME"}
            ]}
        ]
    })
}

/// Plugin map with `app` applying two plugins and the given plugin archives
pub fn plugin_model(plugin_jars: &[&Path]) -> Value {
    let jars: Vec<String> = plugin_jars
        .iter()
        .map(|jar| jar.display().to_string())
        .collect();
    json!({
        "projectToPluginMapping": {
            "sample": [],
            "app": ["application", "com.example.greeting"],
            "core": ["java-library"],
            "all_plugin_jars_path": jars
        }
    })
}
