//! Simulated infinite-scroll session.

use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use turbo_query::{DehydratedState, ProximitySignal, QueryClient, Viewport};

use super::{parse_filter, ScrollArgs};
use crate::context::Context;
use crate::output::status_badge;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run the scroll command.
pub async fn run(args: ScrollArgs, ctx: &Context) -> Result<()> {
    let filter = parse_filter(&args.filter, &ctx.output);
    let scroll = &ctx.config.scroll;
    let source = ctx.config.source(filter);
    let total = source.total_items();
    let client = QueryClient::new(ctx.config.cache());
    let key = ctx.config.infinite_key(filter);

    if let Some(ref file) = args.hydrate {
        let path = ctx.resolve_path(file);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let state = DehydratedState::from_json(&json)
            .with_context(|| format!("Invalid dehydrated state: {}", path.display()))?;
        let restored = client.hydrate(state)?;
        ctx.output.debug(&format!("Hydrated {} queries from {}", restored, path.display()));
    }

    let query = client.infinite_query(key.clone(), source);
    let signal = ProximitySignal::new(scroll.threshold);
    let subscription = query.bind(&signal);

    let step = (scroll.viewport_height / 2.0).max(scroll.row_height);
    let mut viewport = Viewport::new(scroll.viewport_height)
        .with_content_height(query.loaded_count() as f64 * scroll.row_height);

    let pb = ctx.output.progress(total as u64, filter.label());
    pb.set_position(query.loaded_count() as u64);

    while query.has_more() {
        if let Some(max) = args.max_pages {
            if query.pages().len() >= max as usize {
                break;
            }
        }

        viewport.scroll_by(step);
        if signal.observe(&viewport) > 0 {
            while query.is_fetching() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        if let Some(err) = query.last_error() {
            pb.abandon();
            bail!("Failed to load page {}: {}", query.pages().len() + 1, err);
        }

        viewport.set_content_height(query.loaded_count() as f64 * scroll.row_height);
        pb.set_position(query.loaded_count() as u64);
    }

    pb.finish_and_clear();
    subscription.unsubscribe();

    let status = query.status();
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "key": key.to_string(),
            "status": status,
            "totalItems": query.total_items(),
            "loaded": query.loaded_count(),
            "pages": query.data().page_params,
            "hasMore": query.has_more(),
            "requests": query.requests(),
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Scrolled {}", key));
    ctx.output.kv("status", &status_badge(status.as_str()));
    ctx.output.kv(
        "total",
        &query
            .total_items()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    );
    ctx.output.kv("loaded", &query.loaded_count().to_string());
    ctx.output.kv("pages", &query.pages().len().to_string());
    ctx.output.kv("requests", &query.requests().to_string());
    ctx.output.kv("has more", status_badge(if query.has_more() { "yes" } else { "no" }).as_str());

    Ok(())
}
