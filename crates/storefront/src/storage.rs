//! Durable key-value storage for visitor state.
//!
//! Visitor state (credential, role, cart, last placed order) lives in a
//! string-keyed store that survives across requests. In production that is
//! the visitor's server-side session; tests use [`MemoryStorage`].
//!
//! Values are opaque strings. Callers serialize structured values to JSON
//! before writing and treat unparseable values as absent.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tower_sessions::Session;

/// Storage keys for visitor state.
pub mod keys {
    /// Bearer token returned by a successful login.
    pub const TOKEN: &str = "token";

    /// `"admin"` for an admin login, `"user"` otherwise.
    pub const ROLE: &str = "role";

    /// JSON array of cart lines.
    pub const CART: &str = "cart";

    /// JSON snapshot of the last order placed from this browser.
    pub const PENDING_ORDER: &str = "pendingOrder";

    /// JSON profile returned by the login endpoint.
    pub const USER: &str = "user";
}

/// Errors from reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed store that persists across requests.
pub trait DurableStorage: Send + Sync {
    /// Read the value under `key`, if any.
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn set_item(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

// =============================================================================
// Session-backed storage
// =============================================================================

/// Storage backed by the visitor's `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

impl DurableStorage for SessionStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove::<String>(key).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Process-local storage, shared between clones.
///
/// Writes can be switched to fail, to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `set_item`/`remove_item` calls fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of everything currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn snapshot(&self) -> Result<HashMap<String, String>, StorageError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl DurableStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item(keys::CART).await.unwrap(), None);

        storage.set_item(keys::CART, "[]".to_string()).await.unwrap();
        assert_eq!(storage.get_item(keys::CART).await.unwrap().as_deref(), Some("[]"));

        storage.remove_item(keys::CART).await.unwrap();
        storage.remove_item(keys::CART).await.unwrap();
        assert_eq!(storage.get_item(keys::CART).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_state() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set_item(keys::TOKEN, "t".to_string()).await.unwrap();
        assert_eq!(b.get_item(keys::TOKEN).await.unwrap().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_memory_storage_failing_writes() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::ROLE, "user".to_string()).await.unwrap();
        storage.set_fail_writes(true);

        assert!(storage.set_item(keys::ROLE, "admin".to_string()).await.is_err());
        assert!(storage.remove_item(keys::ROLE).await.is_err());
        assert_eq!(storage.get_item(keys::ROLE).await.unwrap().as_deref(), Some("user"));
    }
}
