//! Device key material and its identifier.

use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};

/// Size of a symmetric key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Identifier the clients have always used for the per-device user key.
pub const DEFAULT_KEY_ID: &str = "com.contextcapsule.userkey";

/// Logical name a key is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Creates a new KeyId
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for KeyId {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ID)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 256-bit secret that never leaves the device.
///
/// Bytes live in a zeroize-on-drop box and `Debug` never prints them.
pub struct SymmetricKey(SecretBox<[u8; KEY_SIZE]>);

impl SymmetricKey {
    /// Draws a fresh key from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyGenerationFailed` if the RNG is unavailable.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = Box::new([0u8; KEY_SIZE]);
        OsRng
            .try_fill_bytes(bytes.as_mut_slice())
            .map_err(|e| CryptoError::key_generation_failed(format!("OS RNG failure: {e}")))?;
        Ok(Self(SecretBox::new(bytes)))
    }

    /// Wraps raw key bytes read back from a store.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidData` unless exactly 32 bytes are given.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::invalid_data(format!(
                "expected {KEY_SIZE} bytes of key material, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(array))
    }

    /// Wraps a fixed-size byte array.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    /// Exposes the raw bytes to a store or cipher.
    #[must_use]
    pub fn expose(&self) -> &[u8; KEY_SIZE] {
        self.0.expose_secret()
    }

    /// Constant-time comparison.
    #[must_use]
    pub fn ct_eq(&self, other: &Self) -> bool {
        self.expose()[..].ct_eq(&other.expose()[..]).into()
    }
}

impl Clone for SymmetricKey {
    fn clone(&self) -> Self {
        Self::from_bytes(*self.expose())
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SymmetricKey").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_distinct_keys() {
        let a = SymmetricKey::generate().unwrap();
        let b = SymmetricKey::generate().unwrap();
        assert!(!a.ct_eq(&b));
    }

    #[test]
    fn test_from_slice_length_checked() {
        assert!(SymmetricKey::from_slice(&[7u8; KEY_SIZE]).is_ok());
        assert!(matches!(
            SymmetricKey::from_slice(&[7u8; 16]),
            Err(CryptoError::InvalidData { .. })
        ));
        assert!(SymmetricKey::from_slice(&[]).is_err());
    }

    #[test]
    fn test_clone_preserves_bytes() {
        let key = SymmetricKey::from_bytes([9u8; KEY_SIZE]);
        let copy = key.clone();
        assert!(key.ct_eq(&copy));
        assert_eq!(copy.expose(), &[9u8; KEY_SIZE]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SymmetricKey::from_bytes([0xab; KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("171"));
        assert!(!debug.to_lowercase().contains("abab"));
    }

    #[test]
    fn test_key_id_display_and_default() {
        assert_eq!(KeyId::default().as_str(), DEFAULT_KEY_ID);
        assert_eq!(KeyId::new("capsule-test").to_string(), "capsule-test");
    }

    #[test]
    fn test_key_id_serializes_as_string() {
        let json = serde_json::to_string(&KeyId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
