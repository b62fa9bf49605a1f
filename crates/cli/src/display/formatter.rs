use anyhow::Result;
use gradle_probe_core::{ClassSource, DependencyEdge, DependencyKind, ProjectNode, TaskDescriptor};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Tasks grouped by owning project, in model order
pub fn print_tasks(tasks: &[TaskDescriptor]) {
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }

    let mut current_project: Option<&str> = None;
    for task in tasks {
        if current_project != Some(task.project_path.as_str()) {
            if current_project.is_some() {
                println!();
            }
            println!("📦 {}", task.project_path);
            current_project = Some(&task.project_path);
        }
        print!("   {}", task.path);
        match task.group.as_deref() {
            Some("") => print!("  [\"\"]"),
            Some(group) => print!("  [{group}]"),
            None => {}
        }
        if let Some(description) = &task.description {
            print!("  - {description}");
        }
        println!();
    }
}

pub fn print_projects(projects: &[ProjectNode]) {
    for project in projects {
        let marker = if project.is_root() { "🏠" } else { "📦" };
        println!(
            "{marker} {} ({})  {}",
            project.path,
            project.name,
            project.project_directory.display()
        );
    }
}

pub fn format_edge(edge: &DependencyEdge) -> String {
    match &edge.kind {
        DependencyKind::LibraryArtifact { file } => {
            format!("{:<10} {}", edge.scope, file.display())
        }
        DependencyKind::ModuleReference { target } => {
            format!("{:<10} module {}", edge.scope, target)
        }
    }
}

pub fn print_module_dependencies(module: &str, edges: &[DependencyEdge]) {
    println!("📦 {module} ({} dependencies)", edges.len());
    for edge in edges {
        println!("   {}", format_edge(edge));
    }
}

pub fn print_edge_set(edges: &BTreeSet<DependencyEdge>) {
    for edge in edges {
        println!("{edge}");
    }
    println!("\n{} distinct dependency edges", edges.len());
}

pub fn print_graph(graph: &BTreeMap<String, BTreeSet<String>>) {
    for (module, targets) in graph {
        if targets.is_empty() {
            println!("{module}");
        } else {
            let targets: Vec<&str> = targets.iter().map(String::as_str).collect();
            println!("{module} -> {}", targets.join(", "));
        }
    }
}

pub fn describe_source(source: &ClassSource) -> String {
    match source {
        ClassSource::Archive(path) => format!("📚 archive {}", path.display()),
        ClassSource::Module(name) => format!("📦 module {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_edge() {
        assert_eq!(
            format_edge(&DependencyEdge::library("core", "COMPILE", "/cache/libX.jar")),
            "COMPILE    /cache/libX.jar"
        );
        assert_eq!(
            format_edge(&DependencyEdge::module("app", "RUNTIME", "core")),
            "RUNTIME    module core"
        );
    }

    #[test]
    fn test_describe_source() {
        assert_eq!(
            describe_source(&ClassSource::Module("core".to_string())),
            "📦 module core"
        );
    }
}
