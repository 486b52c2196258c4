//! Client-side data fetching for TurboScroll.
//!
//! This crate provides:
//! - `QueryKey` - Stable cache identity (namespace plus active filter)
//! - `QueryCache` / `MemoryQueryCache` - Injectable cache collaborator
//! - `InfiniteQuery` - Incremental page accumulator with an in-flight guard
//! - `ProximitySignal` - "Near end of content" events with explicit subscriptions
//! - `QueryClient` - Cached list queries, infinite-query prefetch, hydration
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_catalog::{Catalog, CatalogSource};
//! use turbo_query::{MemoryQueryCache, ProximitySignal, QueryClient, QueryKey, Viewport};
//!
//! let client = QueryClient::new(MemoryQueryCache::new());
//! let key = QueryKey::new("shoes-infinite");
//! let source = CatalogSource::new(Catalog::generate(50));
//!
//! // Server side: prefetch page 1 and ship the dehydrated cache.
//! client.prefetch_infinite_query(&key, &source).await?;
//! let state = client.dehydrate()?;
//!
//! // Client side: hydrate, then let scrolling pull further pages.
//! let browser = QueryClient::new(MemoryQueryCache::new());
//! browser.hydrate(state)?;
//! let query = browser.infinite_query(key, source);
//!
//! let signal = ProximitySignal::default();
//! let _subscription = query.bind(&signal);
//! signal.observe(&Viewport::new(800.0).with_content_height(900.0));
//! ```

mod cache;
mod client;
mod error;
mod hydrate;
mod infinite;
mod key;
mod proximity;

pub use cache::*;
pub use client::*;
pub use error::*;
pub use hydrate::*;
pub use infinite::*;
pub use key::*;
pub use proximity::*;
