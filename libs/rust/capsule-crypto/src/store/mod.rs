//! Key persistence.
//!
//! A [`KeyStore`] holds raw key bytes under a [`KeyId`]. Implementations must
//! never log the bytes they hold.

mod file;
mod memory;

pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;

use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeyId, SymmetricKey};

/// Protected storage for device keys.
pub trait KeyStore: Send + Sync {
    /// Persists `key` under `id`, replacing any previous entry atomically.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyStoreUnavailable` if the write fails.
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()>;

    /// Reads the key stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyNotFound` when no entry exists and
    /// `CryptoError::KeyStoreUnavailable` when the entry cannot be read.
    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey>;

    /// Removes the entry under `id`. Succeeds if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyStoreUnavailable` if the removal fails.
    fn delete(&self, id: &KeyId) -> CryptoResult<()>;

    /// Reports whether an entry exists without handing out key bytes.
    ///
    /// # Errors
    ///
    /// Propagates store failures other than absence.
    fn contains(&self, id: &KeyId) -> CryptoResult<bool> {
        match self.retrieve(id) {
            Ok(_) => Ok(true),
            Err(CryptoError::KeyNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Short backend name used in log fields.
    fn backend(&self) -> &'static str;
}
