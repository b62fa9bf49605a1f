use anyhow::{Context as _, Result};
use tracing::debug;

use super::Context;
use crate::display::{
    print_edge_set, print_graph, print_json, print_module_dependencies, print_projects,
    print_tasks,
};

pub fn tasks_command(ctx: &Context, group: Option<&str>) -> Result<()> {
    debug!("Listing tasks (group: {:?})", group);
    let tasks = ctx
        .inspector()
        .list_tasks(&ctx.root, group)
        .with_context(|| format!("Failed to list tasks of {}", ctx.root.display()))?;

    if ctx.json {
        return print_json(&tasks);
    }
    print_tasks(&tasks);
    Ok(())
}

pub fn projects_command(ctx: &Context) -> Result<()> {
    let projects = ctx
        .inspector()
        .list_projects(&ctx.root)
        .with_context(|| format!("Failed to list projects of {}", ctx.root.display()))?;

    if ctx.json {
        return print_json(&projects);
    }
    print_projects(&projects);
    Ok(())
}

pub fn deps_command(ctx: &Context, module: Option<&str>, all: bool) -> Result<()> {
    let inspector = ctx.inspector();

    if all {
        let edges = inspector
            .get_all_dependencies(&ctx.root)
            .context("Failed to collect dependencies")?;
        if ctx.json {
            return print_json(&edges);
        }
        print_edge_set(&edges);
        return Ok(());
    }

    match module {
        Some(module) => {
            let edges = inspector
                .list_module_dependencies(&ctx.root, module)
                .with_context(|| format!("Failed to list dependencies of module '{module}'"))?;
            if ctx.json {
                return print_json(&edges);
            }
            print_module_dependencies(module, &edges);
        }
        None => {
            let modules = inspector
                .list_all_module_dependencies(&ctx.root)
                .context("Failed to list module dependencies")?;
            if ctx.json {
                let by_module: Vec<_> = modules
                    .iter()
                    .map(|(name, edges)| serde_json::json!({"module": name, "dependencies": edges}))
                    .collect();
                return print_json(&by_module);
            }
            for (index, (name, edges)) in modules.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                print_module_dependencies(name, edges);
            }
        }
    }
    Ok(())
}

pub fn graph_command(ctx: &Context) -> Result<()> {
    let graph = ctx
        .inspector()
        .module_dependency_graph(&ctx.root)
        .context("Failed to build the module graph")?;

    if ctx.json {
        return print_json(&graph);
    }
    print_graph(&graph);
    Ok(())
}
