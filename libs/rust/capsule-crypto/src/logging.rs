//! Structured logging helpers for crypto operations
//!
//! Fields never include key bytes, plaintext or ciphertext; only sizes,
//! identifiers and outcomes.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cipher::ALGORITHM;
use crate::error::CryptoError;
use crate::key::KeyId;

/// Log a successful crypto operation.
pub fn log_crypto_operation(operation: &str, key_id: &KeyId, duration: Duration, bytes: usize) {
    debug!(
        target: "crypto",
        operation = %operation,
        algorithm = ALGORITHM,
        key_id = %key_id,
        duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        bytes = bytes,
        status = "success",
        "Crypto operation completed"
    );
}

/// Log a crypto error (sanitized).
pub fn log_crypto_error(operation: &str, key_id: &KeyId, error: &CryptoError) {
    warn!(
        target: "crypto",
        operation = %operation,
        key_id = %key_id,
        error_type = %error.error_type(),
        // reasons are sanitized when the error is constructed
        error_message = %error,
        retryable = error.is_retryable(),
        status = "error",
        "Crypto operation failed"
    );
}

/// Log creation of a new device key.
pub fn log_key_created(key_id: &KeyId, backend: &str) {
    info!(
        target: "crypto",
        operation = "key_create",
        key_id = %key_id,
        backend = %backend,
        status = "success",
        "Device key created"
    );
}

/// Log removal of a device key.
pub fn log_key_deleted(key_id: &KeyId, backend: &str) {
    warn!(
        target: "crypto",
        operation = "key_delete",
        key_id = %key_id,
        backend = %backend,
        "Device key deleted; existing blobs under this key are unrecoverable"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_crypto_operation_does_not_panic() {
        log_crypto_operation("encrypt", &KeyId::default(), Duration::from_millis(2), 128);
    }

    #[test]
    fn test_error_type_mapping() {
        let errors = vec![
            CryptoError::key_not_found("test"),
            CryptoError::key_generation_failed("test"),
            CryptoError::key_store_unavailable("test"),
            CryptoError::encryption_failed("test"),
            CryptoError::decryption_failed("test"),
            CryptoError::invalid_data("test"),
            CryptoError::PayloadTooLarge { size: 10, limit: 5 },
            CryptoError::invalid_config("test"),
        ];

        for error in errors {
            log_crypto_error("test", &KeyId::default(), &error);
        }
    }

    #[test]
    fn test_lifecycle_events_do_not_panic() {
        log_key_created(&KeyId::default(), "memory");
        log_key_deleted(&KeyId::default(), "memory");
    }
}
