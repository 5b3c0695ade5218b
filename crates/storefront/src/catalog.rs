//! Cached access to the menu.
//!
//! The menu changes rarely, so it is fetched once and shared by every
//! request until the TTL lapses. Concurrent misses coalesce into a single
//! backend call and failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use bistro_core::MenuItem;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::backend::{ApiError, BackendClient};

const MENU_KEY: &str = "menu";

/// Menu cache in front of [`BackendClient::fetch_items`].
#[derive(Clone)]
pub struct CatalogCache {
    backend: BackendClient,
    cache: Cache<&'static str, Arc<Vec<MenuItem>>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(backend: BackendClient, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { backend, cache }
    }

    /// The current menu, fetching it if the cached copy is missing or stale.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the fetch fails.
    #[instrument(skip(self))]
    pub async fn items(&self) -> Result<Arc<Vec<MenuItem>>, Arc<ApiError>> {
        let backend = self.backend.clone();
        self.cache
            .try_get_with(MENU_KEY, async move {
                debug!("Menu cache miss");
                backend.fetch_items().await.map(Arc::new)
            })
            .await
    }

    /// Drop the cached menu so the next read refetches it.
    pub async fn invalidate(&self) {
        self.cache.invalidate(MENU_KEY).await;
    }
}
