//! Cache-first repository facade
//!
//! [`Repository`] is the caller-facing surface of the pipeline: every
//! fetch checks the entity cache first and only then falls through to the
//! API client, populating the cache on the way back. Surfaced errors are
//! recorded as a polling-friendly [`ErrorReport`] without being swallowed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, ApiResult, ErrorReport};
use crate::importer::config::{BATCH_ITEM_PAUSE, BULK_LIST_LIMIT};
use crate::metrics;
use crate::{normalize_name, NamedResource, Pokemon};

pub mod cache;

pub use cache::{EntityCache, RECENT_CAPACITY};

/// Read-only snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryStats {
    /// Records held by the entity cache
    pub cached_entities: usize,
    /// Entries on the recently-fetched list
    pub recent_entries: usize,
    /// Cached search result sets
    pub cached_searches: usize,
    /// Approximate bytes held by the transport-level response cache
    pub response_cache_bytes: usize,
}

/// Cache-first facade over the API client.
///
/// Intended to live for the process lifetime; construct one and share it.
/// Internally every mutable structure sits behind its own lock, so the
/// facade can be called from concurrent tasks. Two concurrent fetches of
/// the same key may both reach the network; the cache keeps whichever
/// response lands last and both callers receive a fully decoded value.
pub struct Repository {
    client: Arc<ApiClient>,
    cache: EntityCache,
    search_cache: Mutex<HashMap<String, Vec<NamedResource>>>,
    last_error: Mutex<Option<ErrorReport>>,
    loading: AtomicBool,
    batch_pause: Duration,
    list_limit: u32,
}

impl Repository {
    /// Create a repository over a shared API client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            cache: EntityCache::new(),
            search_cache: Mutex::new(HashMap::new()),
            last_error: Mutex::new(None),
            loading: AtomicBool::new(false),
            batch_pause: BATCH_ITEM_PAUSE,
            list_limit: BULK_LIST_LIMIT,
        }
    }

    /// Override the inter-item pause used by [`fetch_batch`](Self::fetch_batch).
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Override the item cap requested from the listing endpoint by
    /// [`search`](Self::search).
    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }

    /// Whether a network fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    /// The most recently surfaced fetch failure, for polling surfaces.
    pub fn last_error(&self) -> Option<ErrorReport> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch a record by id, cache first.
    pub async fn fetch_by_id(&self, id: u32) -> ApiResult<Pokemon> {
        if let Some(cached) = self.cache.get_by_id(id) {
            debug!(id, "entity cache hit");
            metrics::record_cache_hit("entity");
            return Ok(cached);
        }
        metrics::record_cache_miss("entity");
        self.fetch_and_cache(&id.to_string()).await
    }

    /// Fetch a record by name, cache first. Lookups are case-insensitive
    /// and tolerate spaces; a successful fetch is cached under both its id
    /// and its canonical name.
    pub async fn fetch_by_name(&self, name: &str) -> ApiResult<Pokemon> {
        let key = normalize_name(name);
        if let Some(cached) = self.cache.get_by_name(&key) {
            debug!(name = %key, "entity cache hit");
            metrics::record_cache_hit("entity");
            return Ok(cached);
        }
        metrics::record_cache_miss("entity");
        self.fetch_and_cache(&key).await
    }

    /// Search the listing by case-insensitive substring match on name.
    ///
    /// The large listing itself rides the transport-level response cache;
    /// the filtered result set is cached per lowercased query.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<NamedResource>> {
        let key = query.trim().to_lowercase();

        if let Some(hits) = self
            .search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
        {
            debug!(query = %key, hits = hits.len(), "search cache hit");
            metrics::record_cache_hit("search");
            return Ok(hits);
        }
        metrics::record_cache_miss("search");

        let page = match self.client.list_pokemon(self.list_limit, 0).await {
            Ok(page) => page,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        let hits: Vec<NamedResource> = page
            .results
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&key))
            .collect();

        self.search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, hits.clone());
        Ok(hits)
    }

    /// Fetch several records sequentially, skipping individual failures.
    ///
    /// Failed ids are logged, never fatal; a short pause between items
    /// smooths bursts on top of the rate limiter's own guarantee.
    pub async fn fetch_batch(&self, ids: &[u32]) -> Vec<Pokemon> {
        let mut fetched = Vec::with_capacity(ids.len());

        for (index, &id) in ids.iter().enumerate() {
            match self.fetch_by_id(id).await {
                Ok(pokemon) => fetched.push(pokemon),
                Err(e) => {
                    warn!(id, error = %e, "skipping batch item after fetch failure");
                }
            }

            if index + 1 < ids.len() {
                sleep(self.batch_pause).await;
            }
        }

        fetched
    }

    /// Recently fetched records, most recent first.
    pub fn recent(&self) -> Vec<Pokemon> {
        self.cache.recent()
    }

    /// Clear the entity cache, the search cache, and the transport-level
    /// response cache. Synchronous with respect to the caller.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.client.clear_response_cache();
        debug!("all cache tiers cleared");
    }

    /// Read-only snapshot of cache occupancy.
    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            cached_entities: self.cache.len(),
            recent_entries: self.cache.recent_len(),
            cached_searches: self
                .search_cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            response_cache_bytes: self.client.response_cache_bytes(),
        }
    }

    async fn fetch_and_cache(&self, key: &str) -> ApiResult<Pokemon> {
        self.loading.store(true, Ordering::Relaxed);
        let result = self.client.fetch_pokemon(key).await;
        self.loading.store(false, Ordering::Relaxed);

        match result {
            Ok(pokemon) => {
                if let Err(reason) = pokemon.validate() {
                    warn!(name = %pokemon.name, reason = %reason, "fetched record failed validation");
                }
                self.cache.put(pokemon.clone());
                self.clear_error();
                Ok(pokemon)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn record_error(&self, error: &ApiError) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(ErrorReport::from(error));
    }

    fn clear_error(&self) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::rate_limit::RateLimiter;

    #[test]
    fn test_fresh_repository_stats_are_zero() {
        let client = Arc::new(ApiClient::new(RateLimiter::shared()).unwrap());
        let repo = Repository::new(client);

        let stats = repo.stats();
        assert_eq!(stats.cached_entities, 0);
        assert_eq!(stats.recent_entries, 0);
        assert_eq!(stats.cached_searches, 0);
        assert_eq!(stats.response_cache_bytes, 0);
        assert!(repo.last_error().is_none());
        assert!(!repo.is_loading());
    }
}
