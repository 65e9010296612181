//! Crypto Configuration
//!
//! Type-safe configuration for the artifact crypto service with validation.

use capsule_common::{ConfigError, EnvLookup, ProcessEnv, load_dotenv, parse_var};
use std::path::PathBuf;

use crate::cipher::MIN_BLOB_SIZE;
use crate::key::DEFAULT_KEY_ID;

/// Default cap on an encrypted blob, in decoded bytes (10 MiB).
pub const DEFAULT_MAX_BLOB_BYTES: usize = 10 * 1024 * 1024;

/// Longest accepted key identifier.
pub const MAX_KEY_ID_LEN: usize = 128;

/// Configuration for the artifact crypto service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    /// Identifier the device key is stored under
    pub key_id: String,
    /// Largest encrypted blob accepted, in decoded bytes
    pub max_blob_bytes: usize,
    /// Directory for the file key store; `None` keeps keys in memory
    pub key_store_dir: Option<PathBuf>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key_id: DEFAULT_KEY_ID.to_string(),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
            key_store_dir: None,
        }
    }
}

impl CryptoConfig {
    /// Creates a new config with the given key identifier
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    /// Creates a new config with the given blob size limit
    #[must_use]
    pub const fn with_max_blob_bytes(mut self, max: usize) -> Self {
        self.max_blob_bytes = max;
        self
    }

    /// Creates a new config storing keys under `dir`
    #[must_use]
    pub fn with_key_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.key_store_dir = Some(dir.into());
        self
    }

    /// Loads configuration from the process environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse or validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(&ProcessEnv)
    }

    /// Loads configuration from `env`, falling back to defaults.
    ///
    /// Reads `CAPSULE_KEY_ID`, `CAPSULE_MAX_BLOB_BYTES` and
    /// `CAPSULE_KEY_STORE_DIR`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable fails to parse or validate.
    pub fn from_lookup<E: EnvLookup + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(key_id) = env.get("CAPSULE_KEY_ID") {
            config.key_id = key_id.trim().to_string();
        }
        if let Some(max) = parse_var(env, "CAPSULE_MAX_BLOB_BYTES")? {
            config.max_blob_bytes = max;
        }
        config.key_store_dir = env
            .get("CAPSULE_KEY_STORE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Key identifier is empty or longer than 128 characters
    /// - Blob limit is below the size of an empty blob (28 bytes)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_id.is_empty() {
            return Err(ConfigError::missing("key_id"));
        }

        if self.key_id.chars().count() > MAX_KEY_ID_LEN {
            return Err(ConfigError::invalid(
                "key_id",
                format!("cannot exceed {MAX_KEY_ID_LEN} characters"),
            ));
        }

        if self.max_blob_bytes < MIN_BLOB_SIZE {
            return Err(ConfigError::invalid(
                "max_blob_bytes",
                format!("must be at least {MIN_BLOB_SIZE}"),
            ));
        }

        Ok(())
    }
}
