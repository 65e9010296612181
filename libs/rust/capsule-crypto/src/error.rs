//! Crypto error types
//!
//! Reasons carried by these errors are sanitized on construction so that
//! nothing resembling key material ends up in logs or error chains.

use capsule_common::ConfigError;
use thiserror::Error;

/// Errors raised by key management and artifact encryption.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// No key is stored under the identifier
    #[error("Key not found: {key_id}")]
    KeyNotFound {
        /// Key identifier that was not found
        key_id: String,
    },

    /// A new key could not be generated or durably stored
    #[error("Key generation failed: {reason}")]
    KeyGenerationFailed {
        /// Reason for failure (sanitized)
        reason: String,
    },

    /// The key store failed for a reason other than absence
    #[error("Key store unavailable: {reason}")]
    KeyStoreUnavailable {
        /// Reason for failure (sanitized)
        reason: String,
    },

    /// Encryption operation failed
    #[error("Encryption failed: {reason}")]
    EncryptionFailed {
        /// Reason for failure (sanitized)
        reason: String,
    },

    /// Authentication failed or the ciphertext was rejected
    #[error("Decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for failure (sanitized)
        reason: String,
    },

    /// Input was not valid base64, UTF-8, or long enough to hold a blob
    #[error("Invalid data: {reason}")]
    InvalidData {
        /// What was wrong with the input
        reason: String,
    },

    /// Blob exceeds the configured maximum
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Size of the offending blob in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Invalid configuration
    #[error("Invalid crypto configuration: {reason}")]
    InvalidConfig {
        /// Reason for invalid configuration
        reason: String,
    },
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

impl CryptoError {
    /// Creates a KeyNotFound error
    #[must_use]
    pub fn key_not_found(key_id: impl Into<String>) -> Self {
        Self::KeyNotFound {
            key_id: key_id.into(),
        }
    }

    /// Creates a KeyGenerationFailed error
    #[must_use]
    pub fn key_generation_failed(reason: impl Into<String>) -> Self {
        Self::KeyGenerationFailed {
            reason: sanitize_error_message(&reason.into()),
        }
    }

    /// Creates a KeyStoreUnavailable error
    #[must_use]
    pub fn key_store_unavailable(reason: impl Into<String>) -> Self {
        Self::KeyStoreUnavailable {
            reason: sanitize_error_message(&reason.into()),
        }
    }

    /// Creates an EncryptionFailed error
    #[must_use]
    pub fn encryption_failed(reason: impl Into<String>) -> Self {
        Self::EncryptionFailed {
            reason: sanitize_error_message(&reason.into()),
        }
    }

    /// Creates a DecryptionFailed error
    #[must_use]
    pub fn decryption_failed(reason: impl Into<String>) -> Self {
        Self::DecryptionFailed {
            reason: sanitize_error_message(&reason.into()),
        }
    }

    /// Creates an InvalidData error
    #[must_use]
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: sanitize_error_message(&reason.into()),
        }
    }

    /// Creates an InvalidConfig error
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Checks if this error is retryable.
    ///
    /// Only store outages qualify. Decryption failures are deterministic for a
    /// given key and ciphertext.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::KeyStoreUnavailable { .. })
    }

    /// Stable snake_case label for logs and metrics.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::KeyNotFound { .. } => "key_not_found",
            Self::KeyGenerationFailed { .. } => "key_generation_failed",
            Self::KeyStoreUnavailable { .. } => "key_store_unavailable",
            Self::EncryptionFailed { .. } => "encryption_failed",
            Self::DecryptionFailed { .. } => "decryption_failed",
            Self::InvalidData { .. } => "invalid_data",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

impl From<ConfigError> for CryptoError {
    fn from(err: ConfigError) -> Self {
        Self::invalid_config(err.to_string())
    }
}

/// Sensitive patterns that should be sanitized from error messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "key", "secret", "password", "token", "private", "nonce", "iv",
];

const REDACTED: &str = "Operation failed (details redacted)";

/// Sanitizes error messages to remove potential key material
fn sanitize_error_message(message: &str) -> String {
    let lower = message.to_lowercase();

    if looks_like_key_material(&lower) {
        return REDACTED.to_string();
    }

    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(&format!("{pattern}=")) || lower.contains(&format!("{pattern}: 0x")) {
            return REDACTED.to_string();
        }
    }

    message.to_string()
}

/// Checks if a string contains a run that looks like encoded key material
fn looks_like_key_material(s: &str) -> bool {
    // 32+ hex chars = 16+ bytes; 43+ base64 chars = 32+ bytes
    s.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '"' | '\'' | '(' | ')'))
        .any(|token| {
            let hex_run = token.len() >= 32 && token.chars().all(|c| c.is_ascii_hexdigit());
            let b64_run = token.len() >= 43
                && token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_'));
            hex_run || b64_run
        })
}
