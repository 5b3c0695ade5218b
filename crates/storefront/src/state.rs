//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::backend::{ApiError, BackendClient};
use crate::catalog::CatalogCache;
use crate::config::StorefrontConfig;
use crate::storage::SessionStorage;
use crate::store::StoreContext;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the menu cache and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    catalog: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let backend = BackendClient::new(&config.backend)?;
        let catalog = CatalogCache::new(backend.clone(), config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                catalog,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the restaurant backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the shared menu cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    /// Build the visitor's store for this request.
    pub async fn open_store(&self, session: Session) -> StoreContext<SessionStorage> {
        StoreContext::initialize(SessionStorage::new(session), self.catalog()).await
    }
}
