//! Key Manager for the device key lifecycle
//!
//! `Absent → Stored` happens only inside [`KeyManager::get_or_create`], which
//! holds a per-identifier lock across the read and the write so concurrent
//! callers converge on a single key.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeyId, SymmetricKey};
use crate::logging::{log_key_created, log_key_deleted};
use crate::metrics::CryptoMetrics;
use crate::store::KeyStore;

/// Manages device keys on top of a [`KeyStore`].
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    /// One lock per identifier, created on first use
    locks: Mutex<HashMap<KeyId, Arc<Mutex<()>>>>,
    metrics: Option<CryptoMetrics>,
}

impl KeyManager {
    /// Creates a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Attaches metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: CryptoMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Returns the key under `id`, generating and storing one if absent.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyGenerationFailed` if a new key cannot be
    /// generated or durably stored, and propagates store read failures.
    pub fn get_or_create(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();

        match self.store.retrieve(id) {
            Ok(key) => {
                debug!(target: "crypto", key_id = %id, "Using existing key");
                Ok(key)
            }
            Err(CryptoError::KeyNotFound { .. }) => {
                debug!(target: "crypto", key_id = %id, "Key not found, creating new one");
                let key = SymmetricKey::generate()?;
                // a key that is not persisted would orphan everything sealed with it
                self.store.store(id, &key).map_err(|e| {
                    CryptoError::key_generation_failed(format!("failed to persist new key: {e}"))
                })?;

                log_key_created(id, self.store.backend());
                if let Some(metrics) = &self.metrics {
                    metrics.record_key_generated();
                }
                Ok(key)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the stored key without provisioning one.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyNotFound` if no key is stored.
    pub fn get(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        self.store.retrieve(id)
    }

    /// Whether a key is stored under `id`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn has_key(&self, id: &KeyId) -> CryptoResult<bool> {
        self.store.contains(id)
    }

    /// Permanently deletes the key under `id`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();

        self.store.delete(id)?;
        log_key_deleted(id, self.store.backend());
        Ok(())
    }

    fn lock_for(&self, id: &KeyId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(id.clone()).or_default())
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("backend", &self.store.backend())
            .finish_non_exhaustive()
    }
}
