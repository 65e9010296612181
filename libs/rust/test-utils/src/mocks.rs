//! Key store doubles for testing.
//!
//! Each wraps a [`MemoryKeyStore`] and changes one aspect of its behavior.

use capsule_crypto::{CryptoError, CryptoResult, KeyId, KeyStore, MemoryKeyStore, SymmetricKey};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Store that counts calls per operation.
#[derive(Debug, Default)]
pub struct CountingKeyStore {
    inner: MemoryKeyStore,
    stores: AtomicUsize,
    retrieves: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingKeyStore {
    /// Create an empty counting store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `store` calls.
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    /// Number of `retrieve` calls.
    pub fn retrieve_count(&self) -> usize {
        self.retrieves.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl KeyStore for CountingKeyStore {
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.inner.store(id, key)
    }

    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        self.retrieves.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(id)
    }

    fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id)
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

/// Store whose reads sleep, widening any read-then-write race.
#[derive(Debug)]
pub struct SlowKeyStore {
    inner: CountingKeyStore,
    delay: Duration,
}

impl SlowKeyStore {
    /// Create a store that sleeps `delay` on every read.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: CountingKeyStore::new(),
            delay,
        }
    }

    /// Number of writes that reached the store.
    pub fn store_count(&self) -> usize {
        self.inner.store_count()
    }
}

impl KeyStore for SlowKeyStore {
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()> {
        self.inner.store(id, key)
    }

    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        thread::sleep(self.delay);
        self.inner.retrieve(id)
    }

    fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        self.inner.delete(id)
    }

    fn backend(&self) -> &'static str {
        "slow"
    }
}

/// Operations a [`FailingKeyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailOn {
    /// Fail writes
    pub store: bool,
    /// Fail reads of present entries
    pub retrieve: bool,
    /// Fail deletes
    pub delete: bool,
}

/// Store that fails selected operations with `KeyStoreUnavailable`.
#[derive(Debug, Default)]
pub struct FailingKeyStore {
    inner: MemoryKeyStore,
    fail_on: Mutex<FailOn>,
}

impl FailingKeyStore {
    /// Create a store failing the given operations.
    #[must_use]
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryKeyStore::new(),
            fail_on: Mutex::new(fail_on),
        }
    }

    /// Store that rejects every write, like a read-only keychain.
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(FailOn {
            store: true,
            ..FailOn::default()
        })
    }

    /// Change which operations fail.
    pub fn set_fail_on(&self, fail_on: FailOn) {
        *self.fail_on.lock() = fail_on;
    }

    fn unavailable() -> CryptoError {
        CryptoError::key_store_unavailable("simulated storage failure")
    }
}

impl KeyStore for FailingKeyStore {
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()> {
        if self.fail_on.lock().store {
            return Err(Self::unavailable());
        }
        self.inner.store(id, key)
    }

    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        let key = self.inner.retrieve(id)?;
        if self.fail_on.lock().retrieve {
            return Err(Self::unavailable());
        }
        Ok(key)
    }

    fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        if self.fail_on.lock().delete {
            return Err(Self::unavailable());
        }
        self.inner.delete(id)
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
