use anyhow::{Context as _, Result};
use tracing::info;

use super::Context;
use crate::display::print_json;

/// Task failures are reported on stdout and do not change the exit code
pub fn diagnose_command(ctx: &Context, task: &str, summary: bool) -> Result<()> {
    info!("Running {} in {}", task, ctx.root.display());
    let outcome = ctx
        .inspector()
        .run_task(&ctx.root, task)
        .with_context(|| format!("Failed to run task '{task}'"))?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "task": task,
            "success": outcome.is_success(),
            "headline": outcome.headline(),
            "report": outcome.into_report(),
        }));
    }

    if summary {
        if let Some(headline) = outcome.headline() {
            println!("{headline}");
            return Ok(());
        }
    }
    println!("{}", outcome.into_report());
    Ok(())
}
