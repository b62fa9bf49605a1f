use anyhow::{Context as _, Result};
use gradle_probe_core::ExtensionBootstrapBuilder;

use super::Context;

pub fn bootstrap_command(ctx: &Context, keep: bool) -> Result<()> {
    let builder = ExtensionBootstrapBuilder::new(ctx.config.extensions.clone());

    if keep {
        let path = builder
            .build()
            .and_then(|script| script.persist())
            .context("Failed to write bootstrap script")?;
        println!("{}", path.display());
    } else {
        let script = builder
            .render_script()
            .context("Failed to render bootstrap script")?;
        print!("{script}");
    }
    Ok(())
}
