//! The query cache collaborator.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::key::QueryKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Freshness of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Present and within its stale time.
    Fresh,
    /// Present but due for a refetch.
    Stale,
    /// Not present.
    Miss,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "FRESH"),
            Self::Stale => write!(f, "STALE"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// A cached query value.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached data as JSON.
    pub value: serde_json::Value,
    /// When the value was last written.
    pub updated_at: Instant,
    /// Set by [`QueryCache::invalidate`]; cleared by the next write.
    pub invalidated: bool,
}

impl CacheEntry {
    /// Create an entry written now.
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            updated_at: Instant::now(),
            invalidated: false,
        }
    }

    /// Time since the last write.
    pub fn age(&self) -> Duration {
        self.updated_at.elapsed()
    }
}

/// Cache collaborator used by queries.
///
/// Implementations own storage and staleness; queries only read, write and
/// ask whether a key is due for a refetch.
pub trait QueryCache: Send + Sync {
    /// Get an entry.
    fn get(&self, key: &QueryKey) -> CacheResult<Option<CacheEntry>>;

    /// Store a value, replacing any previous entry.
    fn set(&self, key: &QueryKey, value: serde_json::Value) -> CacheResult<()>;

    /// Whether the entry needs a refetch. Missing keys are stale.
    fn is_stale(&self, key: &QueryKey) -> bool;

    /// Mark an entry stale without dropping its data.
    fn invalidate(&self, key: &QueryKey);

    /// Drop an entry.
    fn remove(&self, key: &QueryKey);

    /// Snapshot of every entry.
    fn entries(&self) -> Vec<(QueryKey, CacheEntry)>;

    /// Freshness of a key.
    fn status(&self, key: &QueryKey) -> CacheStatus {
        match self.get(key) {
            Ok(Some(_)) if self.is_stale(key) => CacheStatus::Stale,
            Ok(Some(_)) => CacheStatus::Fresh,
            _ => CacheStatus::Miss,
        }
    }
}

/// Typed access on top of any [`QueryCache`].
pub trait QueryCacheExt: QueryCache {
    /// Get and deserialize a value.
    fn get_typed<T: DeserializeOwned>(&self, key: &QueryKey) -> CacheResult<Option<T>> {
        match self.get(key)? {
            Some(entry) => Ok(Some(serde_json::from_value(entry.value)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value.
    fn set_typed<T: Serialize>(&self, key: &QueryKey, value: &T) -> CacheResult<()> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<C: QueryCache + ?Sized> QueryCacheExt for C {}

/// In-process cache with a single stale time for every key.
///
/// A stale time of zero marks entries stale as soon as they are written.
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    stale_time: Duration,
}

impl MemoryQueryCache {
    /// Create a cache whose entries are immediately stale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long entries stay fresh.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> CacheResult<Option<CacheEntry>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &QueryKey, value: serde_json::Value) -> CacheResult<()> {
        self.lock().insert(key.clone(), CacheEntry::new(value));
        Ok(())
    }

    fn is_stale(&self, key: &QueryKey) -> bool {
        match self.lock().get(key) {
            Some(entry) => entry.invalidated || entry.age() >= self.stale_time,
            None => true,
        }
    }

    fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.invalidated = true;
        }
    }

    fn remove(&self, key: &QueryKey) {
        self.lock().remove(key);
    }

    fn entries(&self) -> Vec<(QueryKey, CacheEntry)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> QueryKey {
        QueryKey::new("shoes").with_part("all")
    }

    #[test]
    fn test_missing_key_is_stale() {
        let cache = MemoryQueryCache::new();
        assert!(cache.is_stale(&key()));
        assert_eq!(cache.status(&key()), CacheStatus::Miss);
    }

    #[test]
    fn test_zero_stale_time() {
        let cache = MemoryQueryCache::new();
        cache.set(&key(), serde_json::json!(["a"])).unwrap();
        assert!(cache.is_stale(&key()));
        assert_eq!(cache.status(&key()), CacheStatus::Stale);
    }

    #[test]
    fn test_fresh_within_stale_time() {
        let cache = MemoryQueryCache::new().with_stale_time(Duration::from_secs(60));
        cache.set(&key(), serde_json::json!(["a"])).unwrap();
        assert!(!cache.is_stale(&key()));
        assert_eq!(cache.status(&key()), CacheStatus::Fresh);
    }

    #[test]
    fn test_invalidate_then_set() {
        let cache = MemoryQueryCache::new().with_stale_time(Duration::from_secs(60));
        cache.set(&key(), serde_json::json!(1)).unwrap();
        cache.invalidate(&key());
        assert!(cache.is_stale(&key()));
        assert!(cache.get(&key()).unwrap().is_some());

        cache.set(&key(), serde_json::json!(2)).unwrap();
        assert!(!cache.is_stale(&key()));
    }

    #[test]
    fn test_typed_access() {
        let cache = MemoryQueryCache::new();
        cache.set_typed(&key(), &vec![1u32, 2, 3]).unwrap();
        let value: Option<Vec<u32>> = cache.get_typed(&key()).unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));

        let wrong: CacheResult<Option<String>> = cache.get_typed(&key());
        assert!(matches!(wrong, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_remove() {
        let cache = MemoryQueryCache::new();
        cache.set(&key(), serde_json::json!(1)).unwrap();
        assert_eq!(cache.len(), 1);
        cache.remove(&key());
        assert!(cache.is_empty());
    }
}
