//! Turbo CLI - Explore paged and infinite queries over the shoe catalog.
//!
//! Commands:
//! - `turbo page` - Fetch a single page
//! - `turbo scroll` - Simulate an infinite-scroll session
//! - `turbo shoes` - Run the filtered list query against the cache
//! - `turbo prefetch` - Prefetch the first page and write dehydrated state
//! - `turbo config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, PageArgs, PrefetchArgs, ScrollArgs, ShoesArgs};

/// Turbo CLI - Paginated and infinite queries over a simulated shoe catalog
#[derive(Parser)]
#[command(name = "turbo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single page of the catalog
    Page(PageArgs),

    /// Scroll through the catalog, loading pages near the end of content
    Scroll(ScrollArgs),

    /// Run the filtered shoe list query
    Shoes(ShoesArgs),

    /// Prefetch the first page and write the dehydrated cache
    Prefetch(PrefetchArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Page(args) => commands::page::run(args, &ctx).await,
        Commands::Scroll(args) => commands::scroll::run(args, &ctx).await,
        Commands::Shoes(args) => commands::shoes::run(args, &ctx).await,
        Commands::Prefetch(args) => commands::prefetch::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
