//! Shared proptest generators.
//!
//! Reusable strategies for the domain types exercised across the
//! Context Capsule Rust libraries.

use capsule_crypto::{ArtifactKind, KeyId, Metadata, MetadataValue, NewArtifact};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

/// Generate arbitrary byte payloads up to `max_len` bytes.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..=max_len)
}

/// Generate UTF-8 text, including multi-byte characters.
pub fn plaintext_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9 .,!?]{1,200}",
        "\\PC{1,120}",
    ]
}

/// Generate key identifiers in reverse-DNS form.
pub fn key_id_strategy() -> impl Strategy<Value = KeyId> {
    "[a-z]{2,10}(\\.[a-z0-9]{1,12}){1,3}".prop_map(KeyId::new)
}

/// Generate artifact kinds.
pub fn artifact_kind_strategy() -> impl Strategy<Value = ArtifactKind> {
    prop::sample::select(ArtifactKind::ALL.to_vec())
}

/// Generate metadata values up to three levels deep.
pub fn metadata_value_strategy() -> impl Strategy<Value = MetadataValue> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(MetadataValue::Bool),
        any::<i64>().prop_map(MetadataValue::Integer),
        // quarter steps survive a JSON round trip exactly
        (-4000i32..4000).prop_map(|n| MetadataValue::Float(f64::from(n) / 4.0)),
        "[a-zA-Z0-9 ]{0,24}".prop_map(MetadataValue::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(MetadataValue::Array),
            btree_map("[a-z]{1,8}", inner, 0..4).prop_map(MetadataValue::Object),
        ]
    })
}

/// Generate metadata maps.
pub fn metadata_strategy() -> impl Strategy<Value = Metadata> {
    btree_map("[a-zA-Z]{1,12}", metadata_value_strategy(), 0..5)
}

/// Generate capsule create-request artifacts with plaintext blobs.
pub fn new_artifact_strategy() -> impl Strategy<Value = NewArtifact> {
    (
        artifact_kind_strategy(),
        proptest::option::of("[a-zA-Z0-9 ]{1,40}"),
        proptest::option::of(plaintext_strategy()),
        proptest::option::of(metadata_strategy()),
    )
        .prop_map(|(kind, title, blob, metadata)| {
            let mut artifact = NewArtifact::new(kind);
            artifact.title = title;
            artifact.encrypted_blob = blob;
            artifact.metadata = metadata;
            artifact
        })
}

/// Generate blob size limits between the minimum blob and 64 KiB.
pub fn blob_limit_strategy() -> impl Strategy<Value = usize> {
    capsule_crypto::MIN_BLOB_SIZE..=64 * 1024
}
