//! Zero-knowledge artifact encryption for Context Capsule clients.
//!
//! Artifact blobs are sealed on the device with AES-256-GCM before they
//! leave it; the server only ever stores base64 ciphertext. The symmetric
//! key is generated on first use and never exported.
//!
//! - [`ArtifactCryptoService`]: encrypt, decrypt, hash and delete-key
//! - [`KeyManager`]: get-or-create with a per-identifier lock
//! - [`KeyStore`]: secure storage seam, with file and memory backends
//! - [`AeadCipher`]: `nonce ‖ ciphertext ‖ tag` sealing
//! - [`ContentHasher`]: SHA-256 as lowercase hex

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod cipher;
pub mod config;
pub mod error;
pub mod hasher;
pub mod key;
pub mod key_manager;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod store;

pub use artifact::{Artifact, ArtifactKind, BlobCarrier, Metadata, MetadataValue, NewArtifact};
pub use cipher::{AeadCipher, EncryptedBlob, MIN_BLOB_SIZE, NONCE_SIZE, TAG_SIZE};
pub use config::{CryptoConfig, DEFAULT_MAX_BLOB_BYTES};
pub use error::{CryptoError, CryptoResult};
pub use hasher::ContentHasher;
pub use key::{DEFAULT_KEY_ID, KEY_SIZE, KeyId, SymmetricKey};
pub use key_manager::KeyManager;
pub use metrics::CryptoMetrics;
pub use service::ArtifactCryptoService;
pub use store::{FileKeyStore, KeyStore, MemoryKeyStore};
