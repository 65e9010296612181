//! Artifact wire types
//!
//! Only `encrypted_blob` is interpreted by this crate; every other field is
//! carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of captured item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    /// Browser tab
    Tab,
    /// Free-form note
    Note,
    /// Uploaded file
    File,
    /// Text selection
    Selection,
    /// Scroll position within a document
    ScrollPosition,
}

impl ArtifactKind {
    /// All kinds, in wire order.
    pub const ALL: [Self; 5] = [
        Self::Tab,
        Self::Note,
        Self::File,
        Self::Selection,
        Self::ScrollPosition,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "TAB",
            Self::Note => "NOTE",
            Self::File => "FILE",
            Self::Selection => "SELECTION",
            Self::ScrollPosition => "SCROLL_POSITION",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON-shaped metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean
    Bool(bool),
    /// Integer that fits in i64
    Integer(i64),
    /// Any other number
    Float(f64),
    /// String
    String(String),
    /// Array of values
    Array(Vec<MetadataValue>),
    /// Nested object
    Object(Metadata),
}

/// Metadata map attached to artifacts and capsules.
pub type Metadata = BTreeMap<String, MetadataValue>;

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Self>> for MetadataValue {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(v)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(v: Metadata) -> Self {
        Self::Object(v)
    }
}

/// Artifact as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Server-assigned identifier
    pub id: String,
    /// Owning capsule
    pub capsule_id: String,
    /// What was captured
    pub kind: ArtifactKind,
    /// Plaintext title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Base64 ciphertext (plaintext after [`open_artifacts`](crate::ArtifactCryptoService::open_artifacts))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_blob: Option<String>,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Object storage reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Artifact in a capsule create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifact {
    /// What was captured
    pub kind: ArtifactKind,
    /// Plaintext title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Plaintext before sealing, base64 ciphertext after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_blob: Option<String>,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Object storage reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
}

impl NewArtifact {
    /// Creates an artifact of `kind` with no fields set.
    #[must_use]
    pub const fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            title: None,
            encrypted_blob: None,
            metadata: None,
            storage_url: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the blob payload.
    #[must_use]
    pub fn with_blob(mut self, blob: impl Into<String>) -> Self {
        self.encrypted_blob = Some(blob.into());
        self
    }

    /// Inserts a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the storage reference.
    #[must_use]
    pub fn with_storage_url(mut self, url: impl Into<String>) -> Self {
        self.storage_url = Some(url.into());
        self
    }
}

/// Anything carrying an optional blob field.
pub trait BlobCarrier {
    /// Mutable access to the blob field.
    fn blob_mut(&mut self) -> &mut Option<String>;
}

impl BlobCarrier for Artifact {
    fn blob_mut(&mut self) -> &mut Option<String> {
        &mut self.encrypted_blob
    }
}

impl BlobCarrier for NewArtifact {
    fn blob_mut(&mut self) -> &mut Option<String> {
        &mut self.encrypted_blob
    }
}
