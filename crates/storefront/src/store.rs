//! Per-visitor session and cart state.
//!
//! A [`StoreContext`] is built for every request from the visitor's durable
//! storage. It owns the authentication state, the menu snapshot and the cart,
//! and writes the cart back to storage after every mutation.

use std::sync::Arc;

use bistro_core::{Cart, ItemId, MenuItem, Role};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::catalog::CatalogCache;
use crate::storage::{DurableStorage, StorageError, keys};

/// Message shown when the menu could not be loaded.
pub const CATALOG_ERROR_MESSAGE: &str = "Failed to load menu items. Please try again later.";

/// Errors from store transitions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Cart mutation attempted without a credential.
    #[error("Login required to modify the cart")]
    NotAuthenticated,

    /// The item is not on the current menu.
    #[error("Item not found on the menu: {0}")]
    UnknownItem(ItemId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Credential issued by a successful login.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: SecretString,
    pub role: Role,
    /// Profile returned alongside the token, stored as-is.
    pub profile: Option<serde_json::Value>,
}

/// Session, menu and cart for one visitor.
pub struct StoreContext<S> {
    storage: S,
    token: Option<SecretString>,
    role: Role,
    catalog: Arc<Vec<MenuItem>>,
    catalog_error: Option<String>,
    cart: Cart,
    total_items: u32,
}

impl<S: DurableStorage> StoreContext<S> {
    /// Load the visitor's state and the menu.
    ///
    /// Never fails: unreadable storage counts as an anonymous visitor with an
    /// empty cart, and a failed menu fetch leaves an empty menu plus an error
    /// message.
    #[instrument(skip_all)]
    pub async fn initialize(storage: S, catalog: &CatalogCache) -> Self {
        let (menu, persisted) = tokio::join!(
            async {
                catalog.items().await.map_err(|e| {
                    warn!(error = %e, "Failed to load menu");
                    CATALOG_ERROR_MESSAGE.to_string()
                })
            },
            Persisted::read(&storage),
        );
        Self::assemble(storage, persisted, menu)
    }

    /// Load the visitor's state around an already-resolved menu.
    pub async fn restore(storage: S, menu: Result<Arc<Vec<MenuItem>>, String>) -> Self {
        let persisted = Persisted::read(&storage).await;
        Self::assemble(storage, persisted, menu)
    }

    fn assemble(
        storage: S,
        persisted: Persisted,
        menu: Result<Arc<Vec<MenuItem>>, String>,
    ) -> Self {
        let (catalog, catalog_error) = match menu {
            Ok(items) => (items, None),
            Err(message) => (Arc::new(Vec::new()), Some(message)),
        };

        let total_items = persisted.cart.total_items();
        Self {
            storage,
            token: persisted.token,
            role: persisted.role,
            catalog,
            catalog_error,
            cart: persisted.cart,
            total_items,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Authenticated with the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role == Role::Admin
    }

    #[must_use]
    pub fn catalog(&self) -> &[MenuItem] {
        &self.catalog
    }

    #[must_use]
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Badge count: sum of quantities in the cart.
    #[must_use]
    pub const fn total_cart_items(&self) -> u32 {
        self.total_items
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Cart transitions
    // =========================================================================

    /// Add one unit of `item`. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAuthenticated`] for anonymous visitors (the
    /// cart is left untouched), or a storage error from the commit.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn add_to_cart(&mut self, item: &MenuItem) -> Result<u32, StoreError> {
        if !self.is_authenticated() {
            return Err(StoreError::NotAuthenticated);
        }
        let quantity = self.cart.add(item);
        self.recount();
        self.commit().await?;
        Ok(quantity)
    }

    /// Add one unit of the menu item with `id`.
    ///
    /// # Errors
    ///
    /// As [`Self::add_to_cart`], plus [`StoreError::UnknownItem`] when `id` is
    /// not on the menu.
    pub async fn add_item_by_id(&mut self, id: &ItemId) -> Result<u32, StoreError> {
        if !self.is_authenticated() {
            return Err(StoreError::NotAuthenticated);
        }
        let item = self
            .catalog
            .iter()
            .find(|i| &i.id == id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownItem(id.clone()))?;
        self.add_to_cart(&item).await
    }

    /// Remove the line for `id`. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the commit.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove_from_cart(&mut self, id: &ItemId) -> Result<(), StoreError> {
        self.cart.remove(id);
        self.recount();
        self.commit().await
    }

    /// Set the quantity for `id`; below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the commit.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn update_quantity(&mut self, id: &ItemId, quantity: i64) -> Result<(), StoreError> {
        self.cart.set_quantity(id, quantity);
        self.recount();
        self.commit().await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the commit.
    pub async fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.cart.clear();
        self.recount();
        self.commit().await
    }

    /// Write the cart to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub async fn commit(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.cart)?;
        self.storage.set_item(keys::CART, payload).await?;
        debug!(lines = self.cart.len(), total_items = self.total_items, "Cart committed");
        Ok(())
    }

    fn recount(&mut self) {
        self.total_items = self.cart.total_items();
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be stored; the in-memory
    /// session is left unchanged in that case.
    #[instrument(skip_all, fields(role = %credential.role))]
    pub async fn login(&mut self, credential: Credential) -> Result<(), StoreError> {
        use secrecy::ExposeSecret;

        // The token goes last: its presence is what marks a stored session as
        // authenticated, so a partial write must never leave it behind.
        self.storage
            .set_item(keys::ROLE, credential.role.to_string())
            .await?;
        if let Some(profile) = &credential.profile {
            self.storage
                .set_item(keys::USER, serde_json::to_string(profile)?)
                .await?;
        }
        self.storage
            .set_item(keys::TOKEN, credential.token.expose_secret().to_string())
            .await?;

        self.token = Some(credential.token);
        self.role = credential.role;
        Ok(())
    }

    /// Forget the credential and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), StoreError> {
        self.token = None;
        self.role = Role::default();
        self.storage.remove_item(keys::TOKEN).await?;
        self.storage.remove_item(keys::ROLE).await?;
        self.storage.remove_item(keys::USER).await?;
        self.clear_cart().await
    }
}

/// Visitor state as read back from durable storage.
struct Persisted {
    token: Option<SecretString>,
    role: Role,
    cart: Cart,
}

impl Persisted {
    async fn read<S: DurableStorage>(storage: &S) -> Self {
        let token = read_item(storage, keys::TOKEN)
            .await
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        let role = read_item(storage, keys::ROLE)
            .await
            .and_then(|r| r.parse().ok())
            .unwrap_or_default();
        let cart = rehydrate_cart(storage).await;
        Self { token, role, cart }
    }
}

/// Read `key`, treating storage errors as absence.
async fn read_item<S: DurableStorage>(storage: &S, key: &str) -> Option<String> {
    match storage.get_item(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, key, "Failed to read from storage");
            None
        }
    }
}

/// The stored cart, or an empty cart if it is missing or unreadable.
async fn rehydrate_cart<S: DurableStorage>(storage: &S) -> Cart {
    let Some(raw) = read_item(storage, keys::CART).await else {
        return Cart::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "Discarding unreadable stored cart");
        Cart::new()
    })
}
