//! Short-lived caching of the location and sensor catalogs.
//!
//! Listings change only when someone registers a new location or sensor,
//! so they are kept for a TTL and dropped explicitly after a create call.
//! Failed fetches are never cached.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Which catalog listing an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Locations,
    Sensors,
}

impl CatalogKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::Sensors => "sensors",
        }
    }
}

pub type CatalogCache = Cache<CatalogKind, Arc<Vec<String>>>;

#[must_use]
pub fn build_catalog_cache(ttl: Duration) -> CatalogCache {
    Cache::builder()
        .max_capacity(2)
        .time_to_live(ttl)
        .build()
}

pub async fn get_cached(cache: &CatalogCache, kind: CatalogKind) -> Option<Arc<Vec<String>>> {
    let cached = cache.get(&kind).await?;
    tracing::debug!(catalog = kind.as_str(), entries = cached.len(), "cache_hit");
    Some(cached)
}

/// Store a listing and hand back the shared copy.
pub async fn store_cached(
    cache: &CatalogCache,
    kind: CatalogKind,
    entries: Vec<String>,
) -> Arc<Vec<String>> {
    let entries = Arc::new(entries);
    cache.insert(kind, entries.clone()).await;
    tracing::debug!(catalog = kind.as_str(), entries = entries.len(), "cache_stored");
    entries
}

pub async fn invalidate(cache: &CatalogCache, kind: CatalogKind) {
    cache.invalidate(&kind).await;
    tracing::debug!(catalog = kind.as_str(), "cache_invalidated");
}
