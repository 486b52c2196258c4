//! Fetch a single page.

use anyhow::{Context as _, Result};
use turbo_catalog::PageSource;

use super::{parse_filter, print_shoes, PageArgs};
use crate::context::Context;

/// Run the page command.
pub async fn run(args: PageArgs, ctx: &Context) -> Result<()> {
    let filter = parse_filter(&args.filter, &ctx.output);
    let source = ctx.config.source(filter);

    let page = source
        .fetch_page(args.page)
        .await
        .with_context(|| format!("Failed to fetch page {}", args.page))?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header(&format!("{} - page {}", filter.label(), page.page));
    print_shoes(&ctx.output, &page.items);

    ctx.output.info("");
    ctx.output.kv("items", &page.len().to_string());
    ctx.output.kv("total", &page.total_items.to_string());
    ctx.output.kv(
        "next page",
        &page
            .next_page
            .map(|n| n.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );

    Ok(())
}
