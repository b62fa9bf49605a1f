//! Locating classes across module outputs, libraries and plugin archives

use gradle_probe_core::ClassSource;
use gradle_probe_core::daemon::ModelKind;
use gradle_probe_specs::SampleBuild;

#[test]
fn test_library_class_resolves_to_archive() {
    let build = SampleBuild::new();
    let inspector = build.inspector();

    assert_eq!(
        inspector.find_defining_archive(&build.root, "com.x.Y").unwrap(),
        Some(ClassSource::Archive(build.lib_x.clone()))
    );
    assert_eq!(
        inspector
            .find_defining_archive(&build.root, "com.x.Y$Builder")
            .unwrap(),
        Some(ClassSource::Archive(build.lib_x.clone()))
    );
}

#[test]
fn test_module_class_resolves_to_module_name() {
    let build = SampleBuild::new();

    assert_eq!(
        build
            .inspector()
            .find_defining_archive(&build.root, "com.example.core.Engine")
            .unwrap(),
        Some(ClassSource::Module("core".to_string()))
    );
}

#[test]
fn test_plugin_class_needs_the_bootstrap_script() {
    let build = SampleBuild::new();

    let found = build
        .inspector()
        .find_defining_archive(&build.root, "com.example.greeting.GreetingTask")
        .unwrap();
    assert_eq!(found, Some(ClassSource::Archive(build.plugin_jar.clone())));

    let requests = build.daemon.requests();
    let custom = requests
        .iter()
        .find(|request| matches!(request.kind, ModelKind::Custom(_)))
        .unwrap();
    let (_, script) = &custom.init_scripts[0];
    let api_jar = build.dir().join("lib/probe-model-api.jar");
    assert!(script.contains(&api_jar.to_string_lossy().replace('\\', "/")));
}

#[test]
fn test_unknown_class_is_not_found() {
    let build = SampleBuild::new();

    assert_eq!(
        build
            .inspector()
            .find_defining_archive(&build.root, "org.nowhere.Missing")
            .unwrap(),
        None
    );
}

#[test]
fn test_find_plugin_archive() {
    let build = SampleBuild::new();
    let inspector = build.inspector();

    assert_eq!(
        inspector
            .find_plugin_archive(&build.root, "com.example.greeting")
            .unwrap(),
        Some(build.plugin_jar.clone())
    );
    assert_eq!(
        inspector.find_plugin_archive(&build.root, "java-library").unwrap(),
        None
    );
}
