//! CLI configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_catalog::{CatalogOptions, CatalogSource, ShoeFilter};
use turbo_query::{MemoryQueryCache, QueryKey, DEFAULT_THRESHOLD};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Simulated catalog.
    #[serde(default)]
    pub catalog: CatalogOptions,

    /// Query keys and caching.
    #[serde(default)]
    pub query: QueryConfig,

    /// Simulated viewport.
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(path, &content)
    }

    /// Parse config text; `.json` paths are JSON, everything else TOML.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Catalog source with an optional filter applied.
    pub fn source(&self, filter: ShoeFilter) -> CatalogSource {
        CatalogSource::from_options(&self.catalog).with_filter(filter)
    }

    /// Cache with the configured stale time.
    pub fn cache(&self) -> MemoryQueryCache {
        MemoryQueryCache::new().with_stale_time(self.query.stale_time())
    }

    /// Key for the infinite query. The unfiltered feed uses the bare namespace.
    pub fn infinite_key(&self, filter: ShoeFilter) -> QueryKey {
        let key = QueryKey::new(&self.query.infinite_namespace);
        match filter {
            ShoeFilter::All => key,
            other => key.with_part(other),
        }
    }

    /// Key for the filtered list query.
    pub fn list_key(&self, filter: ShoeFilter) -> QueryKey {
        QueryKey::new(&self.query.list_namespace).with_part(filter)
    }
}

/// Query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Namespace of the infinite query key.
    #[serde(default = "default_infinite_namespace")]
    pub infinite_namespace: String,

    /// Namespace of the list query key.
    #[serde(default = "default_list_namespace")]
    pub list_namespace: String,

    /// Seconds cached data stays fresh.
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,
}

fn default_infinite_namespace() -> String {
    "shoes-infinite".to_string()
}

fn default_list_namespace() -> String {
    "shoes".to_string()
}

fn default_stale_time_secs() -> u64 {
    60
}

impl QueryConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            infinite_namespace: default_infinite_namespace(),
            list_namespace: default_list_namespace(),
            stale_time_secs: default_stale_time_secs(),
        }
    }
}

/// Viewport simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Distance from the end of content that triggers the next page.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Rendered height of one item.
    #[serde(default = "default_row_height")]
    pub row_height: f64,

    /// Height of the visible area.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_row_height() -> f64 {
    120.0
}

fn default_viewport_height() -> f64 {
    800.0
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            row_height: default_row_height(),
            viewport_height: default_viewport_height(),
        }
    }
}

/// Generate a default turbo.toml config file.
pub fn generate_default_config() -> String {
    r#"# Turbo catalog configuration

[catalog]
total_items = 50
page_size = 10
# Simulated latency per request
latency_ms = 150

[query]
infinite_namespace = "shoes-infinite"
list_namespace = "shoes"
stale_time_secs = 60

[scroll]
# Load the next page within this distance of the end of content
threshold = 200.0
row_height = 120.0
viewport_height = 800.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = CliConfig::parse("turbo.toml", &generate_default_config()).unwrap();
        assert_eq!(config.catalog.total_items, 50);
        assert_eq!(config.catalog.latency_ms, 150);
        assert_eq!(config.query.stale_time(), Duration::from_secs(60));
        assert_eq!(config.scroll.threshold, 200.0);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = CliConfig::parse("turbo.toml", "[catalog]\ntotal_items = 25\n").unwrap();
        assert_eq!(config.catalog.total_items, 25);
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.query.infinite_namespace, "shoes-infinite");
        assert_eq!(config.scroll.viewport_height, 800.0);
    }

    #[test]
    fn test_json_config() {
        let config = CliConfig::parse("turbo.json", r#"{"query": {"stale_time_secs": 5}}"#).unwrap();
        assert_eq!(config.query.stale_time_secs, 5);
        assert_eq!(config.query.list_namespace, "shoes");
    }

    #[test]
    fn test_query_keys() {
        let config = CliConfig::default();
        assert_eq!(config.infinite_key(ShoeFilter::All).to_string(), "shoes-infinite");
        assert_eq!(
            config.infinite_key(ShoeFilter::Boots).to_string(),
            "shoes-infinite:boots"
        );
        assert_eq!(config.list_key(ShoeFilter::All).to_string(), "shoes:all");
    }
}
