//! CLI command implementations.

pub mod config;
pub mod page;
pub mod prefetch;
pub mod scroll;
pub mod shoes;

use clap::{Args, Subcommand};
use turbo_catalog::{ShoeFilter, ShoeProduct};

use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub struct PageArgs {
    /// Page number, starting at 1.
    #[arg(default_value_t = 1)]
    pub page: u32,

    /// Category filter (all, running, casual, boots).
    #[arg(short, long, default_value = "all")]
    pub filter: String,
}

/// Arguments for the scroll command.
#[derive(Args)]
pub struct ScrollArgs {
    /// Category filter (all, running, casual, boots).
    #[arg(short, long, default_value = "all")]
    pub filter: String,

    /// Stop after this many pages are loaded.
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Start from a dehydrated state file written by `turbo prefetch`.
    #[arg(long)]
    pub hydrate: Option<String>,
}

/// Arguments for the shoes command.
#[derive(Args)]
pub struct ShoesArgs {
    /// Category filter (all, running, casual, boots).
    #[arg(short, long, default_value = "all")]
    pub filter: String,

    /// Number of times to run the query.
    #[arg(long, default_value_t = 2)]
    pub runs: u32,
}

/// Arguments for the prefetch command.
#[derive(Args)]
pub struct PrefetchArgs {
    /// File to write the dehydrated state to.
    #[arg(short, long, default_value = "turbo-state.json")]
    pub out: String,

    /// Category filter (all, running, casual, boots).
    #[arg(short, long, default_value = "all")]
    pub filter: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Initialize a new config file.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse a filter argument, warning when it falls back to all shoes.
pub(crate) fn parse_filter(raw: &str, output: &Output) -> ShoeFilter {
    let filter = ShoeFilter::from_str(raw);
    if filter == ShoeFilter::All && !raw.eq_ignore_ascii_case("all") {
        output.warn(&format!("Unknown filter '{}', showing all shoes", raw));
    }
    filter
}

/// Print shoes as a table.
pub(crate) fn print_shoes<'a>(output: &Output, shoes: impl IntoIterator<Item = &'a ShoeProduct>) {
    let widths = [4, 28, 9, 8, 9, 8];
    output.table_row(&["ID", "NAME", "CATEGORY", "COLOR", "PRICE", "STOCK"], &widths);
    for shoe in shoes {
        let id = shoe.id.to_string();
        let price = shoe.display_price();
        let stock = if shoe.in_stock { "yes" } else { "no" };
        output.table_row(
            &[
                id.as_str(),
                shoe.name.as_str(),
                shoe.category.as_str(),
                shoe.color.as_str(),
                price.as_str(),
                stock,
            ],
            &widths,
        );
    }
}
