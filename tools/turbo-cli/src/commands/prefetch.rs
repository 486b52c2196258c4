//! Prefetch the first page and write the dehydrated cache.

use anyhow::{Context as _, Result};
use turbo_query::{CacheStatus, QueryClient};

use super::{parse_filter, PrefetchArgs};
use crate::context::Context;

/// Run the prefetch command.
pub async fn run(args: PrefetchArgs, ctx: &Context) -> Result<()> {
    let filter = parse_filter(&args.filter, &ctx.output);
    let source = ctx.config.source(filter);
    let client = QueryClient::new(ctx.config.cache());
    let key = ctx.config.infinite_key(filter);

    let spinner = ctx.output.spinner(&format!("Prefetching {}", key));
    let status = client
        .prefetch_infinite_query(&key, &source)
        .await
        .with_context(|| format!("Failed to prefetch {}", key))?;
    spinner.finish_and_clear();

    if status == CacheStatus::Fresh {
        ctx.output.debug(&format!("{} was already fresh", key));
    }

    let state = client.dehydrate();
    let json = state.to_json().context("Failed to serialize dehydrated state")?;

    let path = ctx.resolve_path(&args.out);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "key": key.to_string(),
            "queries": state.len(),
            "path": path.display().to_string(),
        }));
    } else {
        ctx.output.success(&format!(
            "Wrote {} quer{} to {}",
            state.len(),
            if state.len() == 1 { "y" } else { "ies" },
            path.display()
        ));
    }

    Ok(())
}
