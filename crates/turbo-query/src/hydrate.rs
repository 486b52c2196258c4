//! Dehydrating and hydrating cache state.
//!
//! A server prefetches queries into one cache, dehydrates it into a
//! serializable snapshot, and a client hydrates its own cache from that
//! snapshot so the prefetched pages are not requested again.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheResult, QueryCache};
use crate::key::QueryKey;

/// A serializable snapshot of cached queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DehydratedState {
    /// Cached queries, ordered by key.
    pub queries: Vec<DehydratedQuery>,
}

/// One cached query in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DehydratedQuery {
    /// The query key.
    pub key: QueryKey,
    /// The cached data.
    pub data: serde_json::Value,
}

impl DehydratedState {
    /// Format as JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Number of queries in the snapshot.
    pub fn len(&self) -> usize {
        self.queries.len()
    }
}

/// Snapshot every valid entry of `cache`.
///
/// Invalidated entries are left out; a client would refetch them anyway.
pub fn dehydrate(cache: &dyn QueryCache) -> DehydratedState {
    let mut queries: Vec<DehydratedQuery> = cache
        .entries()
        .into_iter()
        .filter(|(_, entry)| !entry.invalidated)
        .map(|(key, entry)| DehydratedQuery {
            key,
            data: entry.value,
        })
        .collect();
    queries.sort_by(|a, b| a.key.cmp(&b.key));

    DehydratedState { queries }
}

/// Write a snapshot into `cache`. Returns the number of restored queries.
///
/// Restored entries count as just written, so they stay fresh for the
/// receiving cache's stale time.
pub fn hydrate(cache: &dyn QueryCache, state: DehydratedState) -> CacheResult<usize> {
    let count = state.queries.len();
    for query in state.queries {
        cache.set(&query.key, query.data)?;
    }

    tracing::debug!(queries = count, "hydrated query cache");
    Ok(count)
}
