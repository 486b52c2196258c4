//! Query error types.

use thiserror::Error;
use turbo_catalog::CatalogError;

/// Errors raised by a cache backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Failed to serialize or deserialize a cached value.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

/// Errors surfaced to query consumers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The data source failed. Nothing was merged.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] CatalogError),

    /// A page completed that was not the next one in sequence.
    #[error("Out-of-order page: expected {expected}, got {got}")]
    OutOfOrder { expected: u32, got: u32 },

    /// The request was dropped before its page completed. Nothing was merged.
    #[error("Request for page {page} was cancelled")]
    Cancelled { page: u32 },

    /// Cache backend error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QueryError {
    /// Whether a new explicit trigger may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => !e.is_contract_violation(),
            Self::Cancelled { .. } | Self::Cache(_) => true,
            Self::OutOfOrder { .. } | Self::Serialization(_) => false,
        }
    }
}

impl From<CacheError> for QueryError {
    fn from(e: CacheError) -> Self {
        QueryError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Serialization(e.to_string())
    }
}
