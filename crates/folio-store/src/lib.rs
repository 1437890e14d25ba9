//! Replay-stable blob store.
//!
//! Every upstream acquisition is persisted under a deterministic key derived
//! from the request parameters. A key is written at most once; re-running the
//! same request replays the stored bytes instead of reaching upstream, so
//! identical inputs produce bit-identical results across runs.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by [`ReplayStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored data for key '{key}'")]
    NotFound { key: String },

    #[error("stored data for key '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("refusing to store empty payload for key '{key}'")]
    EmptyPayload { key: String },

    #[error("failed to write key '{key}': {source}")]
    WriteFailed {
        key: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Deterministic store key built from a prefix and named components.
///
/// Components are sorted by name before hashing, so the same logical request
/// always maps to the same key regardless of argument order. The on-disk file
/// name is the lowercase hex SHA-256 of the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    canonical: String,
    file_name: String,
}

impl StoreKey {
    pub fn new(prefix: &str, components: &[(&str, &str)]) -> Self {
        let mut parts: Vec<(&str, &str)> = components.to_vec();
        parts.sort_by(|left, right| left.0.cmp(right.0));

        let mut canonical = String::from(prefix);
        for (name, value) in parts {
            canonical.push(':');
            canonical.push_str(name);
            canonical.push(':');
            canonical.push_str(value);
        }

        let digest = Sha256::digest(canonical.as_bytes());
        let file_name = format!("{}.dat", hex::encode(digest));

        Self {
            canonical,
            file_name,
        }
    }

    /// The human-readable `prefix:name:value:...` form the hash is taken over.
    pub fn canonical(&self) -> &str {
        self.canonical.as_str()
    }

    /// The hashed on-disk file name, `<sha256-hex>.dat`.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }
}

/// Write-once file store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ReplayStore {
    root: PathBuf,
}

impl ReplayStore {
    /// Opens the store, creating the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened replay store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn exists(&self, key: &StoreKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Reads the stored bytes for `key`.
    ///
    /// A missing key is `NotFound`; an unreadable or empty blob is `Corrupt`.
    /// Corruption is terminal: the caller must never fall back to refetching,
    /// or replay stability would silently break.
    pub fn read(&self, key: &StoreKey) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                key: key.canonical().to_owned(),
            });
        }

        let bytes = fs::read(&path).map_err(|error| StoreError::Corrupt {
            key: key.canonical().to_owned(),
            reason: error.to_string(),
        })?;

        if bytes.is_empty() {
            return Err(StoreError::Corrupt {
                key: key.canonical().to_owned(),
                reason: String::from("stored blob is empty"),
            });
        }

        Ok(bytes)
    }

    /// Writes `data` under `key` atomically (temp file, then rename).
    ///
    /// Concurrent writers of the same key race on the rename; since both hold
    /// the same logical fetch result, the loser's write is redundant rather
    /// than visible.
    pub fn write(&self, key: &StoreKey, data: &[u8]) -> Result<(), StoreError> {
        if data.is_empty() {
            return Err(StoreError::EmptyPayload {
                key: key.canonical().to_owned(),
            });
        }

        let path = self.path_for(key);
        let temp = self.root.join(format!("{}.tmp", key.file_name()));

        fs::write(&temp, data).map_err(|source| StoreError::WriteFailed {
            key: key.canonical().to_owned(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| StoreError::WriteFailed {
            key: key.canonical().to_owned(),
            source,
        })?;

        debug!(key = key.canonical(), bytes = data.len(), "stored blob");
        Ok(())
    }

    /// Writes only when the key is not already present.
    ///
    /// Returns `true` when this call stored the data, `false` when the key
    /// already existed and the stored bytes were left untouched.
    pub fn write_if_absent(&self, key: &StoreKey, data: &[u8]) -> Result<bool, StoreError> {
        if self.exists(key) {
            debug!(key = key.canonical(), "key already present, not overwriting");
            return Ok(false);
        }

        self.write(key, data)?;
        Ok(true)
    }

    fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key() -> StoreKey {
        StoreKey::new(
            "prices",
            &[
                ("ticker", "AAPL"),
                ("start", "2023-01-01"),
                ("end", "2023-12-31"),
            ],
        )
    }

    #[test]
    fn key_components_are_order_insensitive() {
        let forward = StoreKey::new("prices", &[("a", "1"), ("b", "2")]);
        let reversed = StoreKey::new("prices", &[("b", "2"), ("a", "1")]);

        assert_eq!(forward.canonical(), "prices:a:1:b:2");
        assert_eq!(forward.file_name(), reversed.file_name());
    }

    #[test]
    fn distinct_requests_map_to_distinct_keys() {
        let aapl = StoreKey::new("prices", &[("ticker", "AAPL")]);
        let msft = StoreKey::new("prices", &[("ticker", "MSFT")]);
        assert_ne!(aapl.file_name(), msft.file_name());
    }

    #[test]
    fn round_trips_stored_bytes() {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");

        store.write(&key(), b"payload").expect("write");
        assert!(store.exists(&key()));
        assert_eq!(store.read(&key()).expect("read"), b"payload");
    }

    #[test]
    fn read_of_missing_key_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");

        let error = store.read(&key()).expect_err("should be missing");
        assert!(matches!(error, StoreError::NotFound { .. }));
    }

    #[test]
    fn empty_blob_is_corrupt() {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");

        std::fs::write(store.root().join(key().file_name()), b"").expect("write empty");
        let error = store.read(&key()).expect_err("should be corrupt");
        assert!(matches!(error, StoreError::Corrupt { .. }));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");

        let error = store.write(&key(), b"").expect_err("should reject");
        assert!(matches!(error, StoreError::EmptyPayload { .. }));
    }

    #[test]
    fn write_if_absent_preserves_the_first_write() {
        let temp = tempdir().expect("tempdir");
        let store = ReplayStore::open(temp.path().join("store")).expect("open");

        assert!(store.write_if_absent(&key(), b"first").expect("first write"));
        assert!(!store.write_if_absent(&key(), b"second").expect("second write"));
        assert_eq!(store.read(&key()).expect("read"), b"first");
    }
}
