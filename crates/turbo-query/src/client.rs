//! Query client: cached list queries, infinite-query prefetch and hydration.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use turbo_catalog::PageSource;

use crate::cache::{CacheStatus, QueryCache, QueryCacheExt};
use crate::error::QueryError;
use crate::hydrate::{self, DehydratedState};
use crate::infinite::{InfiniteData, InfiniteQuery, INITIAL_PAGE_PARAM};
use crate::key::QueryKey;

/// Data returned by a query, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// The query data.
    pub data: T,
    /// `Fresh` if served from cache; `Miss` or `Stale` if fetched.
    pub status: CacheStatus,
}

impl<T> QueryResult<T> {
    /// Whether the data came from the cache without a fetch.
    pub fn from_cache(&self) -> bool {
        self.status == CacheStatus::Fresh
    }
}

/// Entry point for running queries against a shared cache.
#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<dyn QueryCache>,
}

impl QueryClient {
    /// Create a client owning `cache`.
    pub fn new(cache: impl QueryCache + 'static) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Create a client over an already shared cache.
    pub fn from_shared(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<dyn QueryCache> {
        &self.cache
    }

    /// Run a query, serving fresh cached data without calling `fetcher`.
    ///
    /// Stale or missing data is fetched and written back. A failed fetch
    /// leaves any previous entry in place.
    pub async fn fetch_query<T, F, Fut, E>(
        &self,
        key: &QueryKey,
        fetcher: F,
    ) -> Result<QueryResult<T>, QueryError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<QueryError>,
    {
        let status = self.cache.status(key);

        if status == CacheStatus::Fresh {
            if let Some(data) = self.cache.get_typed::<T>(key)? {
                tracing::debug!(key = %key, "served from cache");
                return Ok(QueryResult { data, status });
            }
        }

        tracing::debug!(key = %key, status = %status, "fetching query");
        let data = fetcher().await.map_err(Into::into)?;
        self.cache.set_typed(key, &data)?;

        Ok(QueryResult { data, status })
    }

    /// Fetch the first page of an infinite query into the cache.
    ///
    /// Skipped when the key already holds fresh data.
    pub async fn prefetch_infinite_query<S: PageSource>(
        &self,
        key: &QueryKey,
        source: &S,
    ) -> Result<CacheStatus, QueryError> {
        let status = self.cache.status(key);
        if status == CacheStatus::Fresh {
            tracing::debug!(key = %key, "prefetch skipped, cache is fresh");
            return Ok(status);
        }

        let page = source.fetch_page(INITIAL_PAGE_PARAM).await?;
        let data = InfiniteData::first(page);
        self.cache.set_typed(key, &data)?;

        tracing::debug!(key = %key, items = data.loaded_count(), "prefetched first page");
        Ok(status)
    }

    /// Create an infinite query seeded from this client's cache.
    pub fn infinite_query<S: PageSource>(&self, key: QueryKey, source: S) -> InfiniteQuery<S> {
        InfiniteQuery::with_cache(key, source, Arc::clone(&self.cache))
    }

    /// Mark a query stale so the next run refetches it.
    pub fn invalidate(&self, key: &QueryKey) {
        self.cache.invalidate(key);
    }

    /// Snapshot the cache for transfer to another client.
    pub fn dehydrate(&self) -> DehydratedState {
        hydrate::dehydrate(self.cache.as_ref())
    }

    /// Restore a snapshot into the cache.
    pub fn hydrate(&self, state: DehydratedState) -> Result<usize, QueryError> {
        Ok(hydrate::hydrate(self.cache.as_ref(), state)?)
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.cache.entries().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryQueryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use turbo_catalog::{Catalog, CatalogError, CatalogSource, ShoeFilter, ShoeProduct};

    fn shoes_key(filter: ShoeFilter) -> QueryKey {
        QueryKey::new("shoes").with_part(filter)
    }

    #[tokio::test]
    async fn test_fetch_query_serves_fresh_cache() {
        let client = QueryClient::new(MemoryQueryCache::new().with_stale_time(Duration::from_secs(60)));
        let source = CatalogSource::new(Catalog::generate(30));
        let calls = AtomicUsize::new(0);
        let key = shoes_key(ShoeFilter::Running);

        for expected in [CacheStatus::Miss, CacheStatus::Fresh] {
            let result: QueryResult<Vec<ShoeProduct>> = client
                .fetch_query(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    source.list(ShoeFilter::Running)
                })
                .await
                .unwrap();
            assert_eq!(result.status, expected);
            assert_eq!(result.data.len(), 10);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_query_refetches_stale() {
        let client = QueryClient::new(MemoryQueryCache::new());
        let key = shoes_key(ShoeFilter::All);

        let first = client
            .fetch_query(&key, || async { Ok::<_, CatalogError>(vec![1u32]) })
            .await
            .unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        let second = client
            .fetch_query(&key, || async { Ok::<_, CatalogError>(vec![1u32, 2]) })
            .await
            .unwrap();
        assert_eq!(second.status, CacheStatus::Stale);
        assert!(!second.from_cache());
        assert_eq!(second.data, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_query_failure_keeps_entry() {
        let client = QueryClient::new(MemoryQueryCache::new());
        let key = shoes_key(ShoeFilter::Casual);
        client
            .fetch_query(&key, || async { Ok::<_, CatalogError>(vec![7u32]) })
            .await
            .unwrap();

        let err = client
            .fetch_query(&key, || async {
                Err::<Vec<u32>, _>(CatalogError::unavailable("offline"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Fetch(_)));

        let cached: Option<Vec<u32>> = client.cache().get_typed(&key).unwrap();
        assert_eq!(cached, Some(vec![7]));
    }

    #[tokio::test]
    async fn test_filters_use_separate_keys() {
        let client = QueryClient::new(MemoryQueryCache::new().with_stale_time(Duration::from_secs(60)));
        let source = CatalogSource::new(Catalog::generate(30));

        let boots = client
            .fetch_query(&shoes_key(ShoeFilter::Boots), || source.list(ShoeFilter::Boots))
            .await
            .unwrap();
        let casual = client
            .fetch_query(&shoes_key(ShoeFilter::Casual), || source.list(ShoeFilter::Casual))
            .await
            .unwrap();

        assert_eq!(boots.status, CacheStatus::Miss);
        assert_eq!(casual.status, CacheStatus::Miss);
        assert!(boots.data.iter().all(|s| s.category == "Boots"));
    }

    #[tokio::test]
    async fn test_prefetch_then_infinite_query() {
        let client = QueryClient::new(MemoryQueryCache::new());
        let key = QueryKey::new("shoes-infinite");
        let source = CatalogSource::new(Catalog::generate(25));

        let status = client.prefetch_infinite_query(&key, &source).await.unwrap();
        assert_eq!(status, CacheStatus::Miss);

        let query = client.infinite_query(key, source);
        assert_eq!(query.loaded_count(), 10);
        assert_eq!(query.total_items(), Some(25));
        assert_eq!(query.requests(), 0);

        let outcome = query.fetch_next_page().await.unwrap();
        assert!(matches!(outcome, crate::FetchOutcome::Appended { page: 2, .. }));
    }

    #[tokio::test]
    async fn test_prefetch_skips_fresh() {
        let client = QueryClient::new(MemoryQueryCache::new().with_stale_time(Duration::from_secs(60)));
        let key = QueryKey::new("shoes-infinite");
        let source = CatalogSource::new(Catalog::generate(25));

        client.prefetch_infinite_query(&key, &source).await.unwrap();
        let again = client.prefetch_infinite_query(&key, &source).await.unwrap();
        assert_eq!(again, CacheStatus::Fresh);
    }

    #[tokio::test]
    async fn test_prefetch_invalid_source_page_is_surfaced() {
        struct Broken;

        #[async_trait::async_trait]
        impl PageSource for Broken {
            type Item = u32;

            async fn fetch_page(&self, _page: u32) -> Result<turbo_catalog::Page<u32>, CatalogError> {
                Err(CatalogError::unavailable("down"))
            }

            fn page_size(&self) -> usize {
                10
            }
        }

        let client = QueryClient::new(MemoryQueryCache::new());
        let key = QueryKey::new("broken");
        let err = client.prefetch_infinite_query(&key, &Broken).await.unwrap_err();
        assert_eq!(err, QueryError::Fetch(CatalogError::unavailable("down")));
        assert_eq!(client.cache().status(&key), CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_dehydrate_hydrate_between_clients() {
        let server = QueryClient::new(MemoryQueryCache::new());
        let key = QueryKey::new("shoes-infinite");
        let source = CatalogSource::new(Catalog::generate(25));
        server.prefetch_infinite_query(&key, &source).await.unwrap();

        let state = server.dehydrate();
        assert_eq!(state.len(), 1);

        let browser = QueryClient::new(MemoryQueryCache::new());
        assert_eq!(browser.hydrate(state).unwrap(), 1);

        let query = browser.infinite_query(key, source);
        assert_eq!(query.loaded_count(), 10);
        assert!(query.has_more());
    }
}
