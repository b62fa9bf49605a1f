use anyhow::{Context as _, Result};
use gradle_probe_core::ArchiveIndexer;
use std::path::Path;

use super::Context;
use crate::display::{describe_source, print_json};

pub fn locate_command(ctx: &Context, class_name: &str) -> Result<()> {
    let source = ctx
        .inspector()
        .find_defining_archive(&ctx.root, class_name)
        .with_context(|| format!("Failed to locate {class_name}"))?;

    if ctx.json {
        return print_json(&serde_json::json!({"class": class_name, "source": source}));
    }
    match source {
        Some(source) => println!("{}", describe_source(&source)),
        None => println!("{class_name} not found in any dependency or plugin archive"),
    }
    Ok(())
}

/// Reads the archive directly; the daemon is not involved
pub fn classes_command(ctx: &Context, archive: &Path) -> Result<()> {
    let classes = ArchiveIndexer::class_names_of(archive)
        .with_context(|| format!("Failed to index {}", archive.display()))?;

    if ctx.json {
        return print_json(&classes);
    }
    for class in &classes {
        println!("{class}");
    }
    Ok(())
}
