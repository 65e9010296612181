//! Process-local key store.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::KeyStore;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeyId, SymmetricKey};

/// Keeps keys in memory for the life of the process.
///
/// Used by tests and by sessions that must not touch disk.
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: RwLock<HashMap<KeyId, SymmetricKey>>,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl KeyStore for MemoryKeyStore {
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()> {
        self.entries.write().insert(id.clone(), key.clone());
        Ok(())
    }

    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CryptoError::key_not_found(id.as_str()))
    }

    fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        self.entries.write().remove(id);
        Ok(())
    }

    fn contains(&self, id: &KeyId) -> CryptoResult<bool> {
        Ok(self.entries.read().contains_key(id))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
