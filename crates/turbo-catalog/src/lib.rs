//! Shoe catalog model and paged data source for TurboScroll.
//!
//! This crate provides:
//! - `ShoeProduct` / `Catalog` - The fixed backing dataset
//! - `ShoeFilter` - Category filters for list and paged queries
//! - `Page` - One bounded slice of the catalog plus pagination metadata
//! - `PageSource` / `CatalogSource` - The paged data source contract
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_catalog::{Catalog, CatalogSource, PageSource};
//!
//! let source = CatalogSource::new(Catalog::generate(25));
//!
//! let first = source.fetch_page(1).await?;
//! assert_eq!(first.len(), 10);
//! assert_eq!(first.next_page, Some(2));
//! ```

pub mod error;
pub mod filter;
pub mod item;
pub mod page;
pub mod source;

pub use error::CatalogError;
pub use filter::ShoeFilter;
pub use item::{Catalog, ShoeProduct};
pub use page::{page_bounds, Page};
pub use source::{CatalogOptions, CatalogSource, PageSource, DEFAULT_PAGE_SIZE};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::filter::ShoeFilter;
    pub use crate::item::{Catalog, ShoeProduct};
    pub use crate::page::Page;
    pub use crate::source::{CatalogOptions, CatalogSource, PageSource};
}
