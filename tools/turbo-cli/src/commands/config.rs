//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    let catalog = &ctx.config.catalog;
    ctx.output.info("[catalog]");
    ctx.output.kv("total_items", &catalog.total_items.to_string());
    ctx.output.kv("page_size", &catalog.page_size.to_string());
    ctx.output.kv("latency_ms", &catalog.latency_ms.to_string());

    let query = &ctx.config.query;
    ctx.output.info("");
    ctx.output.info("[query]");
    ctx.output.kv("infinite_namespace", &query.infinite_namespace);
    ctx.output.kv("list_namespace", &query.list_namespace);
    ctx.output.kv("stale_time_secs", &query.stale_time_secs.to_string());

    let scroll = &ctx.config.scroll;
    ctx.output.info("");
    ctx.output.info("[scroll]");
    ctx.output.kv("threshold", &scroll.threshold.to_string());
    ctx.output.kv("row_height", &scroll.row_height.to_string());
    ctx.output.kv("viewport_height", &scroll.viewport_height.to_string());

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
