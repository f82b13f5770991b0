//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use shilpkaar_search::{FilterOptions, SearchIndex};

use crate::config::ApiConfig;

/// Filter-option aggregations are recomputed when a write touches the index,
/// so a short TTL keeps them fresh without hammering the searcher.
const FILTER_CACHE_TTL: Duration = Duration::from_secs(60);
const FILTER_CACHE_CAPACITY: u64 = 1_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, the search index, and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    search: SearchIndex,
    /// Filter-option aggregations keyed by the query's facet signature.
    filter_cache: Cache<String, FilterOptions>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let filter_cache = Cache::builder()
            .max_capacity(FILTER_CACHE_CAPACITY)
            .time_to_live(FILTER_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                search: SearchIndex::new(),
                filter_cache,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the search index.
    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.inner.search
    }

    /// Get a reference to the filter-option cache.
    #[must_use]
    pub fn filter_cache(&self) -> &Cache<String, FilterOptions> {
        &self.inner.filter_cache
    }

    /// Kick off the background build of the search index from the catalog.
    ///
    /// Searches return 503 until the build completes; the readiness probe
    /// reports the same state.
    pub fn start_search_indexing(&self) {
        shilpkaar_search::build_index_async(self.inner.search.clone(), self.inner.pool.clone());
    }

    /// Drop all cached filter-option aggregations.
    ///
    /// Called after any write that changes the searchable corpus.
    pub fn invalidate_filter_cache(&self) {
        self.inner.filter_cache.invalidate_all();
    }
}
