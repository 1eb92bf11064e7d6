//! Key-value persistence.
//!
//! The engine only needs string get/set with last-write-wins semantics.
//! [`MemoryStore`] backs tests and embedding, [`FileStore`] keeps every entry
//! in a single JSON object on disk.

use crate::week::WeekKey;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: String,
        source: serde_json::Error,
    },
}

/// Abstract synchronous string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Every entry the engine persists. Week-scoped entries carry their week so
/// keys are never assembled by hand at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Board(WeekKey),
    Won(WeekKey),
    Golden(WeekKey),
    Rerolls(WeekKey),
    BingoRewarded(WeekKey),
    GoldenRewarded(WeekKey),
    GoldenCount,
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKey::Board(week) => write!(f, "bingo:{week}"),
            StorageKey::Won(week) => write!(f, "bingo-won-{week}"),
            StorageKey::Golden(week) => write!(f, "bingo-golden-{week}"),
            StorageKey::Rerolls(week) => write!(f, "bingo-rerolls-{week}"),
            StorageKey::BingoRewarded(week) => write!(f, "bingo-rewarded-{week}"),
            StorageKey::GoldenRewarded(week) => write!(f, "golden-rewarded-{week}"),
            StorageKey::GoldenCount => write!(f, "goldenCount"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-object file store. The whole map is rewritten on every `set`,
/// through a sibling temp file so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "store.json";

    /// Opens `store.json` inside `dir`, creating the directory if needed.
    pub fn open_in(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open(dir.join(Self::FILE_NAME))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(FileStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Encode {
            what: self.path.display().to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, encoded).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    /// A failed flush leaves the previous value in place.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        let flushed = self.flush();
        if flushed.is_err() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
        }
        flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> WeekKey {
        "2024-W37".parse().unwrap()
    }

    #[test]
    fn keys_match_persisted_layout() {
        let w = week();
        assert_eq!(StorageKey::Board(w).to_string(), "bingo:2024-W37");
        assert_eq!(StorageKey::Won(w).to_string(), "bingo-won-2024-W37");
        assert_eq!(StorageKey::Golden(w).to_string(), "bingo-golden-2024-W37");
        assert_eq!(StorageKey::Rerolls(w).to_string(), "bingo-rerolls-2024-W37");
        assert_eq!(StorageKey::BingoRewarded(w).to_string(), "bingo-rewarded-2024-W37");
        assert_eq!(StorageKey::GoldenRewarded(w).to_string(), "golden-rewarded-2024-W37");
        assert_eq!(StorageKey::GoldenCount.to_string(), "goldenCount");
    }

    #[test]
    fn memory_store_last_write_wins() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open_in(dir.path().join("nested")).unwrap();
            store.set("goldenCount", "4").unwrap();
        }
        let store = FileStore::open_in(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("goldenCount").unwrap().as_deref(), Some("4"));
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());
    }

    #[test]
    fn failed_flush_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open_in(dir.path()).unwrap();
        store.set("goldenCount", "1").unwrap();
        // The temp file path is taken by a directory, so the next flush fails.
        fs::create_dir(dir.path().join("store.json.tmp")).unwrap();
        assert!(store.set("goldenCount", "2").is_err());
        assert!(store.set("fresh", "x").is_err());
        assert_eq!(store.get("goldenCount").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("fresh").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FileStore::FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt { .. })));
    }
}
