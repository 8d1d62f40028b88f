//! Persistent key-value store for JSON blobs.
//!
//! The game keeps two kinds of durable state: leaderboards (one blob per
//! scope) and the optional announcer credentials. Both go through the
//! [`KvStore`] trait so the ledger never cares where bytes end up.
//!
//! # Key Patterns
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | `leaderboard:global` | Global leaderboard entries |
//! | `leaderboard:channel:{name}` | Per-channel leaderboard entries |
//! | `announcer` | Announce-bot login and OAuth token |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Key-value access to JSON-serializable blobs.
///
/// No transactions: each `set` replaces the whole blob for its key.
pub trait KvStore: Send {
    /// Read the blob stored at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Replace the blob stored at `key`.
    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Read the value at `key` and deserialize it.
///
/// # Errors
///
/// Returns [`StoreError`] if the read fails or the blob has the wrong shape.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}

/// Serialize `value` and store it at `key`.
///
/// # Errors
///
/// Returns [`StoreError`] if serialization or the write fails.
pub fn set_json<T: Serialize>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_value(value)?;
    store.set(key, json)
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store used in tests and when no data directory is configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: BTreeMap<String, serde_json::Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            blobs: BTreeMap::new(),
        }
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no keys are held.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.blobs.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.blobs.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Store that keeps one pretty-printed JSON file per key in a directory.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so
/// a crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "opened JSON file store");
        Ok(Self { dir })
    }

    /// Directory the store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Map a key onto a filesystem-safe file stem.
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&value)?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("emoteguess-store-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        set_json(&mut store, "k", &vec![1_u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = get_json(&store, "k").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let value: Option<String> = get_json(&store, "absent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn file_store_persists_across_handles() {
        let dir = scratch_dir();
        {
            let mut store = JsonFileStore::open(&dir).unwrap();
            set_json(&mut store, "leaderboard:channel:forsen", &"hello").unwrap();
        }
        let store = JsonFileStore::open(&dir).unwrap();
        let value: Option<String> = get_json(&store, "leaderboard:channel:forsen").unwrap();
        assert_eq!(value.as_deref(), Some("hello"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_store_remove_missing_is_ok() {
        let dir = scratch_dir();
        let mut store = JsonFileStore::open(&dir).unwrap();
        assert!(store.remove("nothing").is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_stem_replaces_separators() {
        assert_eq!(file_stem("leaderboard:channel:a/b"), "leaderboard_channel_a_b");
    }
}
