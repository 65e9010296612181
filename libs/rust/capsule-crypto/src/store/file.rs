//! Directory-backed key store.
//!
//! One file per key. The file name is the SHA-256 hex of the identifier, so
//! identifiers never reach the filesystem verbatim. Writes land in a
//! temporary sibling first and are persisted over the target, then the
//! directory itself is synced so the rename survives a crash.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

use super::KeyStore;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{KEY_SIZE, KeyId, SymmetricKey};

const KEY_FILE_EXT: &str = "key";

/// Stores each key as a private file inside one directory.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    /// Opens (creating if needed) a key directory.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyStoreUnavailable` if the directory cannot be
    /// created or restricted to the current user.
    pub fn open(dir: impl Into<PathBuf>) -> CryptoResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error("create key directory", &e))?;
        restrict_dir(&dir).map_err(|e| io_error("restrict key directory", &e))?;
        Ok(Self { dir })
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &KeyId) -> PathBuf {
        let digest = Sha256::digest(id.as_str().as_bytes());
        self.dir
            .join(format!("{}.{KEY_FILE_EXT}", hex::encode(digest)))
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> io::Result<()> {
        // NamedTempFile is created 0600 and removed on drop if never persisted
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.as_file_mut().write_all(bytes)?;
        tmp.as_file().sync_all()?;

        match tmp.persist(target) {
            Ok(_) => {}
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                // rename does not clobber on some platforms
                fs::remove_file(target)?;
                err.file.persist(target).map_err(|e| e.error)?;
            }
            Err(err) => return Err(err.error),
        }

        sync_dir(&self.dir)
    }
}

impl KeyStore for FileKeyStore {
    fn store(&self, id: &KeyId, key: &SymmetricKey) -> CryptoResult<()> {
        self.write_atomic(&self.path_for(id), key.expose())
            .map_err(|e| io_error("write key entry", &e))?;

        debug!(target: "crypto", key_id = %id, backend = "file", "Key entry written");
        Ok(())
    }

    fn retrieve(&self, id: &KeyId) -> CryptoResult<SymmetricKey> {
        let bytes = match fs::read(self.path_for(id)) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CryptoError::key_not_found(id.as_str()));
            }
            Err(e) => return Err(io_error("read key entry", &e)),
        };

        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::key_store_unavailable(format!(
                "corrupt key entry: expected {KEY_SIZE} bytes, found {}",
                bytes.len()
            )));
        }

        SymmetricKey::from_slice(&bytes)
    }

    fn delete(&self, id: &KeyId) -> CryptoResult<()> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => sync_dir(&self.dir).map_err(|e| io_error("sync key directory", &e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete key entry", &e)),
        }
    }

    fn contains(&self, id: &KeyId) -> CryptoResult<bool> {
        self.path_for(id)
            .try_exists()
            .map_err(|e| io_error("stat key entry", &e))
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

fn io_error(action: &str, err: &io::Error) -> CryptoError {
    CryptoError::key_store_unavailable(format!("{action}: {err}"))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileKeyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path().join("keys")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        let key = SymmetricKey::from_bytes([3u8; KEY_SIZE]);

        store.store(&id, &key).unwrap();
        assert!(store.retrieve(&id).unwrap().ct_eq(&key));
        assert!(store.contains(&id).unwrap());
    }

    #[test]
    fn test_missing_entry_is_key_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.retrieve(&KeyId::new("absent")),
            Err(CryptoError::KeyNotFound { .. })
        ));
        assert!(!store.contains(&KeyId::new("absent")).unwrap());
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        store.store(&id, &SymmetricKey::from_bytes([1u8; KEY_SIZE])).unwrap();
        store.store(&id, &SymmetricKey::from_bytes([2u8; KEY_SIZE])).unwrap();

        assert_eq!(store.retrieve(&id).unwrap().expose(), &[2u8; KEY_SIZE]);
        let files = fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(files, 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        // a directory squatting on the entry name makes the final rename fail
        fs::create_dir(store.path_for(&id)).unwrap();

        assert!(matches!(
            store.store(&id, &SymmetricKey::from_bytes([1u8; KEY_SIZE])),
            Err(CryptoError::KeyStoreUnavailable { .. })
        ));
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(names, vec![store.path_for(&id)]);
    }

    #[test]
    fn test_store_and_delete_sync_directory() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        store.store(&id, &SymmetricKey::from_bytes([6u8; KEY_SIZE])).unwrap();
        assert!(sync_dir(store.dir()).is_ok());

        store.delete(&id).unwrap();
        assert!(!store.contains(&id).unwrap());
        assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        store.store(&id, &SymmetricKey::from_bytes([1u8; KEY_SIZE])).unwrap();

        store.delete(&id).unwrap();
        store.delete(&id).unwrap();
        assert!(!store.contains(&id).unwrap());
    }

    #[test]
    fn test_file_name_does_not_leak_identifier() {
        let (_dir, store) = temp_store();
        let id = KeyId::new("user@example.com");
        store.store(&id, &SymmetricKey::from_bytes([1u8; KEY_SIZE])).unwrap();

        for entry in fs::read_dir(store.dir()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!name.contains("example"));
            assert_eq!(name.len(), 64 + 1 + KEY_FILE_EXT.len());
        }
    }

    #[test]
    fn test_corrupt_entry_rejected() {
        let (_dir, store) = temp_store();
        let id = KeyId::default();
        fs::write(store.path_for(&id), [0u8; 7]).unwrap();

        assert!(matches!(
            store.retrieve(&id),
            Err(CryptoError::KeyStoreUnavailable { .. })
        ));
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = KeyId::default();
        let key = SymmetricKey::from_bytes([4u8; KEY_SIZE]);

        FileKeyStore::open(dir.path()).unwrap().store(&id, &key).unwrap();
        let reopened = FileKeyStore::open(dir.path()).unwrap();
        assert!(reopened.retrieve(&id).unwrap().ct_eq(&key));
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        let id = KeyId::default();
        store.store(&id, &SymmetricKey::from_bytes([1u8; KEY_SIZE])).unwrap();

        let file_mode = fs::metadata(store.path_for(&id)).unwrap().permissions().mode();
        let dir_mode = fs::metadata(store.dir()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(dir_mode & 0o777, 0o700);
    }
}
