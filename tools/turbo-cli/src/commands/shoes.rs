//! Filtered list query against the cache.

use anyhow::{Context as _, Result};
use serde::Serialize;
use turbo_catalog::ShoeProduct;
use turbo_query::{QueryClient, QueryResult};

use super::{parse_filter, print_shoes, ShoesArgs};
use crate::context::Context;
use crate::output::status_badge;

#[derive(Serialize)]
struct RunReport {
    run: u32,
    cache: String,
    from_cache: bool,
    items: usize,
}

/// Run the shoes command.
pub async fn run(args: ShoesArgs, ctx: &Context) -> Result<()> {
    let filter = parse_filter(&args.filter, &ctx.output);
    let source = ctx.config.source(filter);
    let client = QueryClient::new(ctx.config.cache());
    let key = ctx.config.list_key(filter);

    ctx.output.header(&format!("{} ({})", filter.label(), key));

    let mut reports = Vec::new();
    let mut last: Option<Vec<ShoeProduct>> = None;

    for run in 1..=args.runs.max(1) {
        let result: QueryResult<Vec<ShoeProduct>> = client
            .fetch_query(&key, || source.list(filter))
            .await
            .with_context(|| format!("Query {} failed", key))?;

        let label = if result.from_cache() {
            "Served from Cache"
        } else {
            "Fetched"
        };
        ctx.output.kv(
            &format!("run {}", run),
            &format!(
                "{} [{}] {} shoes",
                label,
                status_badge(&result.status.to_string()),
                result.data.len()
            ),
        );

        reports.push(RunReport {
            run,
            cache: result.status.to_string(),
            from_cache: result.from_cache(),
            items: result.data.len(),
        });
        last = Some(result.data);
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "key": key.to_string(),
            "runs": reports,
            "items": last.unwrap_or_default(),
        }));
        return Ok(());
    }

    if let Some(shoes) = last {
        ctx.output.info("");
        print_shoes(&ctx.output, &shoes);
    }

    Ok(())
}
