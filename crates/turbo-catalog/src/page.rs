//! Pages and pagination math.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One bounded slice of the catalog plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Page number (1-indexed).
    pub page: u32,
    /// Total number of items across all pages.
    pub total_items: usize,
    /// Next page to request, or `None` when this is the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// Create a page, deriving `next_page` from the position of the slice.
    pub fn new(items: Vec<T>, page: u32, page_size: usize, total_items: usize) -> Self {
        let consumed = (page as usize).saturating_mul(page_size);
        let next_page = if page >= 1 && consumed < total_items {
            Some(page + 1)
        } else {
            None
        };

        Self {
            items,
            page,
            total_items,
            next_page,
        }
    }

    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }

    /// Number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Index range `[(page-1)*page_size, page*page_size)` clamped to `total`.
///
/// Pages past the end produce an empty range. `page` must be at least 1.
pub fn page_bounds(page: u32, page_size: usize, total: usize) -> Range<usize> {
    let start = (page.saturating_sub(1) as usize)
        .saturating_mul(page_size)
        .min(total);
    let end = (page as usize).saturating_mul(page_size).min(total);
    start..end
}
