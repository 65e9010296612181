//! AES-256-GCM with a self-describing combined layout.
//!
//! Layout: `nonce (12) ‖ ciphertext ‖ tag (16)`. This is the byte order
//! CryptoKit's `SealedBox.combined` and Web Crypto (IV prepended to the
//! tagged ciphertext) both produce, so blobs move freely between clients
//! holding the same key.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use std::fmt;

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;

/// Nonce length for AES-GCM.
pub const NONCE_SIZE: usize = 12;

/// Authentication tag length for AES-GCM.
pub const TAG_SIZE: usize = 16;

/// Shortest valid combined blob (empty plaintext).
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Algorithm label used in logs.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Combined `nonce ‖ ciphertext ‖ tag` bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    /// Wraps combined bytes after a length check.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidData` if shorter than [`MIN_BLOB_SIZE`].
    pub fn from_bytes(bytes: Vec<u8>) -> CryptoResult<Self> {
        if bytes.len() < MIN_BLOB_SIZE {
            return Err(CryptoError::invalid_data(format!(
                "blob too short: expected at least {MIN_BLOB_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Decodes the base64 transport form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidData` on malformed base64 or a short blob.
    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| CryptoError::invalid_data(format!("malformed base64: {e}")))?;
        Self::from_bytes(bytes)
    }

    /// Encodes to standard padded base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// The 12-byte nonce prefix.
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_SIZE]
    }

    /// Ciphertext with the trailing tag.
    #[must_use]
    pub fn sealed(&self) -> &[u8] {
        &self.0[NONCE_SIZE..]
    }

    /// Plaintext length this blob will decrypt to.
    #[must_use]
    pub fn plaintext_len(&self) -> usize {
        self.0.len() - MIN_BLOB_SIZE
    }

    /// Total combined length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a blob holds at least a nonce and tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Combined bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the blob, returning the combined bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// Stateless AEAD operations over a [`SymmetricKey`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AeadCipher;

impl AeadCipher {
    /// Seals `plaintext` under a freshly drawn random nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptionFailed` if the AEAD rejects the input.
    pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<EncryptedBlob> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        Self::seal_with_nonce(key, &nonce_bytes, plaintext)
    }

    /// Opens a combined blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptionFailed` if authentication fails; no
    /// plaintext is produced in that case.
    pub fn decrypt(key: &SymmetricKey, blob: &EncryptedBlob) -> CryptoResult<Vec<u8>> {
        let cipher = Self::cipher(key);
        let nonce = Nonce::from_slice(blob.nonce());

        cipher
            .decrypt(nonce, blob.sealed())
            .map_err(|_| CryptoError::decryption_failed("AES-GCM authentication failed"))
    }

    /// Opens raw combined bytes, checking the minimum length first.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidData` for short input and
    /// `CryptoError::DecryptionFailed` if authentication fails.
    pub fn decrypt_bytes(key: &SymmetricKey, combined: &[u8]) -> CryptoResult<Vec<u8>> {
        let blob = EncryptedBlob::from_bytes(combined.to_vec())?;
        Self::decrypt(key, &blob)
    }

    fn seal_with_nonce(
        key: &SymmetricKey,
        nonce_bytes: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> CryptoResult<EncryptedBlob> {
        let cipher = Self::cipher(key);
        let nonce = Nonce::from_slice(nonce_bytes);

        // aes-gcm appends the tag to the ciphertext
        let sealed = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::encryption_failed(format!("AES-GCM encrypt failed: {e}")))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + sealed.len());
        combined.extend_from_slice(nonce_bytes);
        combined.extend_from_slice(&sealed);
        Ok(EncryptedBlob(combined))
    }

    fn cipher(key: &SymmetricKey) -> Aes256Gcm {
        Aes256Gcm::new(key.expose().into())
    }
}
