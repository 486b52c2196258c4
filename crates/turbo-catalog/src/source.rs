//! The paged data source contract and its catalog-backed implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::filter::ShoeFilter;
use crate::item::{Catalog, ShoeProduct};
use crate::page::{page_bounds, Page};

/// Items per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A source of numbered pages.
///
/// Page numbers start at 1. Asking for page 0 is a contract violation and
/// fails with [`CatalogError::InvalidPage`]; asking past the end is not an
/// error and yields an empty page with no `next_page`.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Item type carried by each page.
    type Item: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Fetch one page.
    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, CatalogError>;

    /// Maximum number of items per page.
    fn page_size(&self) -> usize;
}

#[async_trait]
impl<S: PageSource> PageSource for Arc<S> {
    type Item = S::Item;

    async fn fetch_page(&self, page: u32) -> Result<Page<Self::Item>, CatalogError> {
        (**self).fetch_page(page).await
    }

    fn page_size(&self) -> usize {
        (**self).page_size()
    }
}

/// Catalog source settings, as they appear in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOptions {
    /// Number of generated products.
    #[serde(default = "default_total_items")]
    pub total_items: usize,

    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Simulated latency per request, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

fn default_total_items() -> usize {
    50
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            total_items: default_total_items(),
            page_size: default_page_size(),
            latency_ms: 0,
        }
    }
}

/// Paged data source over a fixed in-memory catalog.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    catalog: Catalog,
    /// Filtered view that pages are sliced from.
    items: Vec<ShoeProduct>,
    filter: ShoeFilter,
    page_size: usize,
    latency: Option<Duration>,
}

impl CatalogSource {
    /// Create a source over a catalog with the default page size.
    pub fn new(catalog: Catalog) -> Self {
        let items = catalog.items().to_vec();
        Self {
            catalog,
            items,
            filter: ShoeFilter::All,
            page_size: DEFAULT_PAGE_SIZE,
            latency: None,
        }
    }

    /// Create a source from configuration.
    pub fn from_options(options: &CatalogOptions) -> Self {
        let source = Self::new(Catalog::generate(options.total_items))
            .with_page_size(options.page_size);

        if options.latency_ms > 0 {
            source.with_latency(Duration::from_millis(options.latency_ms))
        } else {
            source
        }
    }

    /// Set the page size. Zero is treated as 1.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add simulated latency to every request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Restrict pages to products matching a filter.
    pub fn with_filter(mut self, filter: ShoeFilter) -> Self {
        self.filter = filter;
        self.items = self.catalog.filtered(filter);
        self
    }

    /// The active filter.
    pub fn filter(&self) -> ShoeFilter {
        self.filter
    }

    /// Number of items visible through the active filter.
    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// The whole filtered list, independent of the active page filter.
    pub async fn list(&self, filter: ShoeFilter) -> Result<Vec<ShoeProduct>, CatalogError> {
        self.simulate_latency().await;
        let items = self.catalog.filtered(filter);
        tracing::debug!(filter = %filter, count = items.len(), "listed catalog");
        Ok(items)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PageSource for CatalogSource {
    type Item = ShoeProduct;

    async fn fetch_page(&self, page: u32) -> Result<Page<ShoeProduct>, CatalogError> {
        if page < 1 {
            return Err(CatalogError::InvalidPage(page));
        }

        self.simulate_latency().await;

        let total = self.items.len();
        let range = page_bounds(page, self.page_size, total);
        let result = Page::new(self.items[range].to_vec(), page, self.page_size, total);

        tracing::debug!(
            page,
            items = result.len(),
            next_page = ?result.next_page,
            "fetched catalog page"
        );

        Ok(result)
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(total: usize) -> CatalogSource {
        CatalogSource::new(Catalog::generate(total))
    }

    #[tokio::test]
    async fn test_twenty_five_items_in_three_pages() {
        let source = source(25);

        let p1 = source.fetch_page(1).await.unwrap();
        assert_eq!(p1.len(), 10);
        assert_eq!(p1.next_page, Some(2));
        assert_eq!(p1.total_items, 25);

        let p2 = source.fetch_page(2).await.unwrap();
        assert_eq!(p2.len(), 10);
        assert_eq!(p2.next_page, Some(3));

        let p3 = source.fetch_page(3).await.unwrap();
        assert_eq!(p3.len(), 5);
        assert_eq!(p3.next_page, None);
    }

    #[tokio::test]
    async fn test_page_zero_is_invalid() {
        let err = source(25).fetch_page(0).await.unwrap_err();
        assert_eq!(err, CatalogError::InvalidPage(0));
        assert!(err.is_contract_violation());
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let page = source(25).fetch_page(7).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next_page, None);
        assert_eq!(page.total_items, 25);
    }

    #[tokio::test]
    async fn test_pages_never_exceed_page_size() {
        let source = source(47).with_page_size(6);
        for n in 1..=10 {
            let page = source.fetch_page(n).await.unwrap();
            assert!(page.len() <= 6);
        }
    }

    #[tokio::test]
    async fn test_slices_are_contiguous() {
        let source = source(25);
        let p2 = source.fetch_page(2).await.unwrap();
        let ids: Vec<u32> = p2.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_filtered_paging() {
        let source = source(30).with_filter(ShoeFilter::Boots);
        assert_eq!(source.total_items(), 10);

        let page = source.fetch_page(1).await.unwrap();
        assert!(page.items.iter().all(|s| s.category == "Boots"));
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_list_ignores_page_filter() {
        let source = source(30).with_filter(ShoeFilter::Boots);
        let running = source.list(ShoeFilter::Running).await.unwrap();
        assert_eq!(running.len(), 10);
    }

    #[test]
    fn test_from_options() {
        let options = CatalogOptions {
            total_items: 12,
            page_size: 0,
            latency_ms: 0,
        };
        let source = CatalogSource::from_options(&options);
        assert_eq!(source.total_items(), 12);
        assert_eq!(source.page_size(), 1);
    }
}
