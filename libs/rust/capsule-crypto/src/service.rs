//! Artifact crypto service
//!
//! The four operations collaborators use: seal a blob before upload, open
//! it after restore, hash content, and delete the device key.

use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

use crate::artifact::BlobCarrier;
use crate::cipher::{AeadCipher, EncryptedBlob};
use crate::config::CryptoConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::hasher::ContentHasher;
use crate::key::KeyId;
use crate::key_manager::KeyManager;
use crate::logging::{log_crypto_error, log_crypto_operation};
use crate::metrics::CryptoMetrics;
use crate::store::{FileKeyStore, KeyStore, MemoryKeyStore};

const OP_ENCRYPT: &str = "encrypt";
const OP_DECRYPT: &str = "decrypt";
const OP_DELETE_KEY: &str = "delete_key";

/// Encrypts and decrypts artifact blobs with the device key.
#[derive(Debug)]
pub struct ArtifactCryptoService {
    keys: KeyManager,
    key_id: KeyId,
    max_blob_bytes: usize,
    metrics: Option<CryptoMetrics>,
}

impl ArtifactCryptoService {
    /// Creates a service over an injected key store.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidConfig` if `config` fails validation.
    pub fn new(store: Arc<dyn KeyStore>, config: &CryptoConfig) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self {
            keys: KeyManager::new(store),
            key_id: KeyId::new(config.key_id.clone()),
            max_blob_bytes: config.max_blob_bytes,
            metrics: None,
        })
    }

    /// Creates a service with the store `config` selects: a [`FileKeyStore`]
    /// when a directory is configured, otherwise a [`MemoryKeyStore`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the key
    /// directory cannot be opened.
    pub fn from_config(config: &CryptoConfig) -> CryptoResult<Self> {
        let store: Arc<dyn KeyStore> = match &config.key_store_dir {
            Some(dir) => Arc::new(FileKeyStore::open(dir)?),
            None => Arc::new(MemoryKeyStore::new()),
        };
        Self::new(store, config)
    }

    /// Attaches metrics to the service and its key manager.
    #[must_use]
    pub fn with_metrics(mut self, metrics: CryptoMetrics) -> Self {
        self.keys = self.keys.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// Identifier of the device key.
    #[must_use]
    pub const fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Encrypts UTF-8 text into a base64 blob, provisioning the device key
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns `KeyGenerationFailed` if a key must be created and cannot be
    /// stored, `PayloadTooLarge` if the blob would exceed the limit, or
    /// `EncryptionFailed`.
    #[instrument(skip_all, fields(key_id = %self.key_id, len = plaintext.len()))]
    pub fn encrypt_artifact_blob(&self, plaintext: &str) -> CryptoResult<String> {
        let started = Instant::now();
        let result = self.encrypt_inner(plaintext);
        self.observe(OP_ENCRYPT, started, plaintext.len(), &result);
        result
    }

    /// Decrypts a base64 blob back to text. Never provisions a key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` for malformed base64 or non-UTF-8 plaintext,
    /// `KeyNotFound` if the device holds no key, `PayloadTooLarge`, or
    /// `DecryptionFailed` if authentication fails.
    #[instrument(skip_all, fields(key_id = %self.key_id, len = encoded.len()))]
    pub fn decrypt_artifact_blob(&self, encoded: &str) -> CryptoResult<String> {
        let started = Instant::now();
        let result = self.decrypt_inner(encoded);
        self.observe(OP_DECRYPT, started, encoded.len(), &result);
        result
    }

    /// SHA-256 of `data` as lowercase hex.
    #[must_use]
    pub fn hash(&self, data: &[u8]) -> String {
        ContentHasher::hash(data)
    }

    /// SHA-256 of the UTF-8 bytes of `text` as lowercase hex.
    #[must_use]
    pub fn hash_str(&self, text: &str) -> String {
        ContentHasher::hash_str(text)
    }

    /// Permanently deletes the device key. Blobs sealed under it can no
    /// longer be opened.
    ///
    /// # Errors
    ///
    /// Propagates key store failures.
    pub fn delete_key(&self) -> CryptoResult<()> {
        self.keys.delete(&self.key_id).inspect_err(|e| {
            log_crypto_error(OP_DELETE_KEY, &self.key_id, e);
        })
    }

    /// Whether the device currently holds a key.
    ///
    /// # Errors
    ///
    /// Propagates key store failures.
    pub fn has_key(&self) -> CryptoResult<bool> {
        self.keys.has_key(&self.key_id)
    }

    /// Seals the blob of every item that carries one, for a capsule create
    /// request. Items without a blob pass through.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partially sealed list is returned.
    pub fn seal_artifacts<T: BlobCarrier>(&self, mut items: Vec<T>) -> CryptoResult<Vec<T>> {
        for item in &mut items {
            let blob = item.blob_mut();
            if let Some(plaintext) = blob.as_deref() {
                *blob = Some(self.encrypt_artifact_blob(plaintext)?);
            }
        }
        Ok(items)
    }

    /// Opens the blob of every item that carries one, after a restore.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partially opened list is returned.
    pub fn open_artifacts<T: BlobCarrier>(&self, mut items: Vec<T>) -> CryptoResult<Vec<T>> {
        for item in &mut items {
            let blob = item.blob_mut();
            if let Some(encoded) = blob.as_deref() {
                *blob = Some(self.decrypt_artifact_blob(encoded)?);
            }
        }
        Ok(items)
    }

    fn encrypt_inner(&self, plaintext: &str) -> CryptoResult<String> {
        self.check_size(plaintext.len().saturating_add(crate::cipher::MIN_BLOB_SIZE))?;
        let key = self.keys.get_or_create(&self.key_id)?;
        let blob = AeadCipher::encrypt(&key, plaintext.as_bytes())?;
        Ok(blob.to_base64())
    }

    fn decrypt_inner(&self, encoded: &str) -> CryptoResult<String> {
        let blob = EncryptedBlob::from_base64(encoded)?;
        self.check_size(blob.len())?;

        let key = self.keys.get(&self.key_id)?;
        let plaintext = AeadCipher::decrypt(&key, &blob)?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::invalid_data(format!("plaintext is not UTF-8: {e}")))
    }

    fn check_size(&self, blob_len: usize) -> CryptoResult<()> {
        if blob_len > self.max_blob_bytes {
            return Err(CryptoError::PayloadTooLarge {
                size: blob_len,
                limit: self.max_blob_bytes,
            });
        }
        Ok(())
    }

    fn observe<T>(&self, operation: &str, started: Instant, bytes: usize, result: &CryptoResult<T>) {
        let elapsed = started.elapsed();
        match result {
            Ok(_) => {
                log_crypto_operation(operation, &self.key_id, elapsed, bytes);
                if let Some(metrics) = &self.metrics {
                    metrics.record_success(operation, elapsed);
                }
            }
            Err(e) => {
                log_crypto_error(operation, &self.key_id, e);
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(operation, e.error_type(), elapsed);
                }
            }
        }
    }
}
