//! Catalog error types.

use thiserror::Error;

/// Errors that can occur while reading pages from a data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Page numbers start at 1.
    #[error("Invalid page: {0} (pages start at 1)")]
    InvalidPage(u32),

    /// The underlying source or transport failed.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Whether this error is a caller contract violation rather than a transport failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidPage(_))
    }
}
