//! Test fixtures with sample data.
//!
//! Pre-built artifacts, keys and known-answer vectors.

use capsule_crypto::{Artifact, ArtifactKind, NewArtifact, SymmetricKey};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed key bytes `00 01 02 .. 1f`.
#[must_use]
pub fn sequential_key() -> SymmetricKey {
    let mut bytes = [0u8; 32];
    for (b, v) in bytes.iter_mut().zip(0u8..) {
        *b = v;
    }
    SymmetricKey::from_bytes(bytes)
}

/// AES-256-GCM known-answer vector (zero key, zero nonce).
#[derive(Debug, Clone, Copy)]
pub struct GcmVector {
    /// Plaintext, hex
    pub plaintext: &'static str,
    /// Ciphertext without tag, hex
    pub ciphertext: &'static str,
    /// Tag, hex
    pub tag: &'static str,
}

/// GCM test cases 13 and 14.
pub const GCM_ZERO_KEY_VECTORS: [GcmVector; 2] = [
    GcmVector {
        plaintext: "",
        ciphertext: "",
        tag: "530f8afbc74536b9a963b4f1c4cb738b",
    },
    GcmVector {
        plaintext: "00000000000000000000000000000000",
        ciphertext: "cea7403d4d606b6e074ec5d3baf39d18",
        tag: "d0d1c8a799996bf0265b98b5d48ab919",
    },
];

/// SHA-256 digests of well-known inputs.
pub const SHA256_VECTORS: [(&str, &str); 3] = [
    ("", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
    ("abc", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
    (
        "hello world",
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
    ),
];

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
        .single()
        .unwrap_or_default()
}

/// A typical capture: two tabs, a note and a scroll position.
#[must_use]
pub fn sample_new_artifacts() -> Vec<NewArtifact> {
    vec![
        NewArtifact::new(ArtifactKind::Tab)
            .with_title("Rust reference")
            .with_blob("https://doc.rust-lang.org/reference/")
            .with_metadata("pinned", true),
        NewArtifact::new(ArtifactKind::Tab)
            .with_title("Design review")
            .with_blob("https://docs.example.com/review"),
        NewArtifact::new(ArtifactKind::Note)
            .with_title("Standup")
            .with_blob("Blocked on key rotation; follow up Thursday ☕")
            .with_metadata("device", "iOS"),
        NewArtifact::new(ArtifactKind::ScrollPosition)
            .with_metadata("scrollY", 1200_i64)
            .with_metadata("zoom", 1.25),
    ]
}

/// A server-side artifact whose blob is `blob`.
#[must_use]
pub fn sample_artifact(kind: ArtifactKind, blob: Option<String>) -> Artifact {
    Artifact {
        id: "clx0000000000000000000000".to_string(),
        capsule_id: "clx1111111111111111111111".to_string(),
        kind,
        title: Some(format!("Sample {kind}")),
        encrypted_blob: blob,
        metadata: None,
        storage_url: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}
