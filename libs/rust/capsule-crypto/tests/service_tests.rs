//! Integration tests for the artifact crypto service.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use capsule_crypto::{
    AeadCipher, ArtifactCryptoService, ArtifactKind, ContentHasher, CryptoConfig, CryptoError,
    FileKeyStore, KeyId, KeyManager, KeyStore, MemoryKeyStore, SymmetricKey,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use test_utils::fixtures::{
    GCM_ZERO_KEY_VECTORS, SHA256_VECTORS, sample_artifact, sample_new_artifacts, sequential_key,
};
use test_utils::mocks::{FailOn, FailingKeyStore, SlowKeyStore};

fn service_over(store: Arc<dyn KeyStore>) -> ArtifactCryptoService {
    ArtifactCryptoService::new(store, &CryptoConfig::default()).unwrap()
}

fn preloaded(key: &SymmetricKey) -> ArtifactCryptoService {
    let store = Arc::new(MemoryKeyStore::new());
    store.store(&KeyId::default(), key).unwrap();
    service_over(store)
}

#[test]
fn test_fresh_device_round_trip() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    let sealed = svc.encrypt_artifact_blob("hello world").unwrap();

    let raw = STANDARD.decode(&sealed).unwrap();
    assert_eq!(raw.len(), 12 + "hello world".len() + 16);
    assert_eq!(svc.decrypt_artifact_blob(&sealed).unwrap(), "hello world");
}

#[test]
fn test_decrypts_blob_from_another_client() {
    // zero key, zero nonce, 16 zero bytes; what any conforming client emits
    let vector = GCM_ZERO_KEY_VECTORS[1];
    let mut combined = vec![0u8; 12];
    combined.extend(hex::decode(vector.ciphertext).unwrap());
    combined.extend(hex::decode(vector.tag).unwrap());

    let svc = preloaded(&SymmetricKey::from_bytes([0u8; 32]));
    let text = svc.decrypt_artifact_blob(&STANDARD.encode(&combined)).unwrap();
    assert_eq!(text.as_bytes(), hex::decode(vector.plaintext).unwrap().as_slice());
}

#[test]
fn test_empty_blob_from_another_client() {
    let vector = GCM_ZERO_KEY_VECTORS[0];
    let mut combined = vec![0u8; 12];
    combined.extend(hex::decode(vector.tag).unwrap());

    let svc = preloaded(&SymmetricKey::from_bytes([0u8; 32]));
    assert_eq!(svc.decrypt_artifact_blob(&STANDARD.encode(&combined)).unwrap(), "");
}

#[test]
fn test_blob_opens_with_same_key_on_second_device() {
    let key = sequential_key();
    let phone = preloaded(&key);
    let laptop = preloaded(&key);

    let sealed = phone.encrypt_artifact_blob("synced between devices").unwrap();
    assert_eq!(laptop.decrypt_artifact_blob(&sealed).unwrap(), "synced between devices");

    // and the raw layout is what the cipher alone would open
    let raw = STANDARD.decode(&sealed).unwrap();
    assert_eq!(
        AeadCipher::decrypt_bytes(&key, &raw).unwrap(),
        b"synced between devices"
    );
}

#[test]
fn test_non_base64_rejected() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    svc.encrypt_artifact_blob("provision").unwrap();

    for input in ["not base64!", "====", "YWJj\u{00e9}"] {
        assert!(
            matches!(
                svc.decrypt_artifact_blob(input),
                Err(CryptoError::InvalidData { .. })
            ),
            "{input:?} should be invalid data"
        );
    }
}

#[test]
fn test_key_deletion_makes_blobs_unrecoverable() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    let sealed = svc.encrypt_artifact_blob("gone after delete").unwrap();

    svc.delete_key().unwrap();
    assert!(matches!(
        svc.decrypt_artifact_blob(&sealed),
        Err(CryptoError::KeyNotFound { .. })
    ));

    // deleting again is harmless
    svc.delete_key().unwrap();
    assert!(!svc.has_key().unwrap());
}

#[test]
fn test_known_hashes() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    for (input, digest) in SHA256_VECTORS {
        assert_eq!(svc.hash(input.as_bytes()), digest);
        assert_eq!(svc.hash_str(input), digest);
    }
    // hashing never provisions a key
    assert!(!svc.has_key().unwrap());
}

#[test]
fn test_hash_of_sealed_blob_is_stable() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    let sealed = svc.encrypt_artifact_blob("checksum me").unwrap();
    assert_eq!(ContentHasher::hash_str(&sealed), svc.hash_str(&sealed));
}

#[test]
fn test_concurrent_first_use_creates_one_key() {
    let store = Arc::new(SlowKeyStore::new(Duration::from_millis(5)));
    let svc = service_over(store.clone());

    let blobs: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = &svc;
                s.spawn(move || svc.encrypt_artifact_blob(&format!("artifact {i}")).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(store.store_count(), 1);
    for (i, blob) in blobs.iter().enumerate() {
        assert_eq!(svc.decrypt_artifact_blob(blob).unwrap(), format!("artifact {i}"));
    }
}

#[test]
fn test_unpersistable_key_fails_encrypt() {
    let svc = service_over(Arc::new(FailingKeyStore::read_only()));
    assert!(matches!(
        svc.encrypt_artifact_blob("never sealed"),
        Err(CryptoError::KeyGenerationFailed { .. })
    ));
    assert!(!svc.has_key().unwrap());
}

#[test]
fn test_store_outage_is_retryable() {
    let store = Arc::new(FailingKeyStore::new(FailOn::default()));
    let svc = service_over(store.clone());
    let sealed = svc.encrypt_artifact_blob("sealed before outage").unwrap();

    store.set_fail_on(FailOn {
        retrieve: true,
        ..FailOn::default()
    });
    let err = svc.decrypt_artifact_blob(&sealed).unwrap_err();
    assert!(matches!(err, CryptoError::KeyStoreUnavailable { .. }));
    assert!(err.is_retryable());

    store.set_fail_on(FailOn::default());
    assert_eq!(svc.decrypt_artifact_blob(&sealed).unwrap(), "sealed before outage");
}

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let sealed = {
        let store = Arc::new(FileKeyStore::open(dir.path()).unwrap());
        service_over(store).encrypt_artifact_blob("survives restart").unwrap()
    };

    let store = Arc::new(FileKeyStore::open(dir.path()).unwrap());
    let svc = service_over(store);
    assert!(svc.has_key().unwrap());
    assert_eq!(svc.decrypt_artifact_blob(&sealed).unwrap(), "survives restart");
}

#[test]
fn test_custom_key_id_isolated() {
    let store: Arc<dyn KeyStore> = Arc::new(MemoryKeyStore::new());
    let work = ArtifactCryptoService::new(
        Arc::clone(&store),
        &CryptoConfig::default().with_key_id("com.contextcapsule.work"),
    )
    .unwrap();
    let personal = service_over(Arc::clone(&store));

    let sealed = work.encrypt_artifact_blob("work only").unwrap();
    assert!(matches!(
        personal.decrypt_artifact_blob(&sealed),
        Err(CryptoError::KeyNotFound { .. })
    ));
    assert_eq!(work.key_id().as_str(), "com.contextcapsule.work");
}

#[test]
fn test_capsule_create_and_restore() {
    let svc = service_over(Arc::new(MemoryKeyStore::new()));
    let drafts = sample_new_artifacts();

    let request = svc.seal_artifacts(drafts.clone()).unwrap();
    let body = serde_json::to_string(&request).unwrap();
    assert!(!body.contains("Blocked on key rotation"));

    // server echoes the sealed blobs back on restore
    let restored: Vec<_> = request
        .into_iter()
        .map(|a| sample_artifact(a.kind, a.encrypted_blob))
        .collect();
    let opened = svc.open_artifacts(restored).unwrap();

    for (draft, artifact) in drafts.iter().zip(&opened) {
        assert_eq!(draft.encrypted_blob, artifact.encrypted_blob);
    }
    assert_eq!(opened[3].kind, ArtifactKind::ScrollPosition);
}

#[test]
fn test_manager_shared_by_store() {
    let store = Arc::new(MemoryKeyStore::new());
    let manager = KeyManager::new(store.clone());
    let key = manager.get_or_create(&KeyId::default()).unwrap();

    let svc = service_over(store);
    let sealed = svc.encrypt_artifact_blob("same key").unwrap();
    let raw = STANDARD.decode(sealed).unwrap();
    assert_eq!(AeadCipher::decrypt_bytes(&key, &raw).unwrap(), b"same key");
}
