use anyhow::{Context as _, Result};

use super::Context;
use crate::display::print_json;

pub fn plugins_command(ctx: &Context, module: &str) -> Result<()> {
    let plugins = ctx
        .inspector()
        .list_plugins_for_module(&ctx.root, module)
        .with_context(|| format!("Failed to query plugins of module '{module}'"))?;

    if ctx.json {
        return print_json(&plugins);
    }
    match plugins {
        Some(plugins) if plugins.is_empty() => println!("No plugins applied to {module}"),
        Some(plugins) => {
            println!("🔌 Plugins applied to {module}:");
            for plugin in plugins {
                println!("   {plugin}");
            }
        }
        // absent key: the module applies nothing or does not exist
        None => println!("No plugin information for {module}"),
    }
    Ok(())
}

pub fn which_plugin_command(ctx: &Context, plugin_id: &str) -> Result<()> {
    let archive = ctx
        .inspector()
        .find_plugin_archive(&ctx.root, plugin_id)
        .with_context(|| format!("Failed to search plugin archives for '{plugin_id}'"))?;

    if ctx.json {
        return print_json(&archive);
    }
    match archive {
        Some(path) => println!("{}", path.display()),
        None => println!("No plugin archive declares {plugin_id}"),
    }
    Ok(())
}
