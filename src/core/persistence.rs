//! Persistence bridge: key-value backends and the snapshot load/save policy
//!
//! The whole [`AppState`] is stored as one JSON blob under a single key.
//! Reads and writes never fail the caller: a bad or missing snapshot means
//! "start from seed", and a failed write is logged and dropped while the
//! in-memory state stays authoritative.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::core::reducer::{reduce, Action};
use crate::core::state::{AppState, PartialState};

/// Key the snapshot is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "sgc-data";

/// SQLite database file name inside the data directory
const SQLITE_FILE: &str = "qmt.db";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Synchronous string key-value storage
pub trait KeyValueStore {
    /// Read the blob for `key`, `None` when absent
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) the blob for `key`
    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Delete the blob for `key`; absent keys are fine
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One JSON file per key: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, blob)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// SQLite-backed storage with a single `kv` table
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, blob],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Which durable backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    /// Open this backend rooted at `data_dir`
    pub fn open(&self, data_dir: &Path) -> Result<Box<dyn KeyValueStore>, StorageError> {
        match self {
            StorageBackend::Json => Ok(Box::new(FileStore::new(data_dir))),
            StorageBackend::Sqlite => Ok(Box::new(SqliteStore::open(&data_dir.join(SQLITE_FILE))?)),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "file" => Ok(StorageBackend::Json),
            "sqlite" | "db" => Ok(StorageBackend::Sqlite),
            _ => Err(format!("Unknown storage backend: {}. Use json or sqlite", s)),
        }
    }
}

/// Loads the persisted snapshot over the seed and saves every new state
pub struct PersistenceBridge {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored snapshot, or `None` if it is missing, unreadable or malformed
    pub fn load_snapshot(&self) -> Option<PartialState> {
        let blob = match self.backend.load(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored snapshot");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read snapshot, using seed data");
                return None;
            }
        };

        match serde_json::from_str::<PartialState>(&blob) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding malformed snapshot, using seed data");
                None
            }
        }
    }

    /// Initial state: the stored snapshot shallow-merged over `seed`
    pub fn bootstrap(&self, seed: AppState) -> AppState {
        match self.load_snapshot() {
            Some(snapshot) => {
                tracing::debug!(fields = ?snapshot.present_fields(), "restoring snapshot");
                reduce(&seed, Action::LoadData(snapshot))
            }
            None => seed,
        }
    }

    /// Save the full state; failures are logged and swallowed
    pub fn persist(&self, state: &AppState) {
        let blob = match serde_json::to_string(state) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize state");
                return;
            }
        };
        if let Err(e) = self.backend.save(&self.key, &blob) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist state");
        }
    }

    /// Drop the stored snapshot so the next start uses seed data
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }

        fn save(&self, _key: &str, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.load("sgc-data").unwrap(), None);
        store.save("sgc-data", "{\"darkMode\":true}").unwrap();
        assert_eq!(
            store.load("sgc-data").unwrap().as_deref(),
            Some("{\"darkMode\":true}")
        );
        store.save("sgc-data", "{}").unwrap();
        assert_eq!(store.load("sgc-data").unwrap().as_deref(), Some("{}"));
        store.remove("sgc-data").unwrap();
        assert_eq!(store.load("sgc-data").unwrap(), None);
        store.remove("sgc-data").unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        exercise(&store);

        let shared = store.clone();
        store.save("k", "v").unwrap();
        assert_eq!(shared.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("nested"));
        exercise(&store);

        store.save("sgc-data", "{}").unwrap();
        assert!(tmp.path().join("nested").join("sgc-data.json").exists());
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let tmp = tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(
            store.save("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_sqlite_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        exercise(&store);
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("qmt.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.save("sgc-data", "[1]").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load("sgc-data").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_backend_parse_and_open() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("json".parse::<StorageBackend>().unwrap(), StorageBackend::Json);
        assert!("redis".parse::<StorageBackend>().is_err());

        let tmp = tempdir().unwrap();
        let backend = StorageBackend::Sqlite.open(tmp.path()).unwrap();
        backend.save("a", "b").unwrap();
        assert!(tmp.path().join(SQLITE_FILE).exists());
    }

    #[test]
    fn test_bootstrap_without_snapshot_returns_seed() {
        let bridge = PersistenceBridge::new(Box::new(MemoryStore::new()), DEFAULT_STORAGE_KEY);
        assert_eq!(bridge.bootstrap(seed::initial_data()), seed::initial_data());
    }

    #[test]
    fn test_bootstrap_discards_malformed_snapshot() {
        let store = MemoryStore::new();
        store.save(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let bridge = PersistenceBridge::new(Box::new(store.clone()), DEFAULT_STORAGE_KEY);
        assert_eq!(bridge.bootstrap(seed::initial_data()), seed::initial_data());

        // Right JSON shape for one field, wrong for another: the whole snapshot is dropped
        store
            .save(DEFAULT_STORAGE_KEY, r#"{"darkMode": true, "risks": 3}"#)
            .unwrap();
        assert!(!bridge.bootstrap(seed::initial_data()).dark_mode);
    }

    #[test]
    fn test_bootstrap_merges_partial_snapshot_over_seed() {
        let store = MemoryStore::new();
        store
            .save(DEFAULT_STORAGE_KEY, r#"{"darkMode": true, "documents": []}"#)
            .unwrap();
        let bridge = PersistenceBridge::new(Box::new(store), DEFAULT_STORAGE_KEY);

        let seed = seed::initial_data();
        let state = bridge.bootstrap(seed.clone());
        assert!(state.dark_mode);
        assert!(state.documents.is_empty());
        assert!(Arc::ptr_eq(&state.risks, &seed.risks));
    }

    #[test]
    fn test_persist_then_bootstrap_roundtrip() {
        let tmp = tempdir().unwrap();
        let bridge = PersistenceBridge::new(Box::new(FileStore::new(tmp.path())), "custom");

        let state = reduce(&seed::initial_data(), Action::ToggleDarkMode);
        bridge.persist(&state);

        let restored = bridge.bootstrap(AppState::default());
        assert_eq!(restored, state);

        bridge.clear().unwrap();
        assert!(bridge.load_snapshot().is_none());
    }

    #[test]
    fn test_failing_backend_is_swallowed() {
        let bridge = PersistenceBridge::new(Box::new(FailingStore), DEFAULT_STORAGE_KEY);
        let seed = seed::initial_data();
        // Neither call panics or errors
        bridge.persist(&seed);
        assert_eq!(bridge.bootstrap(seed.clone()), seed);
    }
}
