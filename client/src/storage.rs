//! Persistence for the collection, the identity cache, and scalar keys.
//!
//! The file implementation keeps three JSON files in one data directory:
//! `quotes.json` (the collection snapshot), `identity.json` (the identity
//! mapping cache), and `meta.json` (last-sync timestamp and the selected
//! category). Every write goes to a temp file followed by a rename, so a
//! failed cycle can never leave a torn file behind.

use quotesync_engine::{
    normalize_batch, Collection, CollectionSnapshot, IdMinter, IdentityCache, RawRecord, Record,
    RecordId, Timestamp, LOCAL_ID_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The persistence boundary of the sync client.
///
/// Owned state lives here between cycles; during a cycle the scheduler loads
/// it, mutates owned copies, and saves the result back.
pub trait Storage: Send + Sync {
    /// Load the persisted collection, if one exists.
    fn load_collection(&self) -> Result<Option<Collection>>;

    /// Persist the collection.
    fn save_collection(&self, collection: &Collection, saved_at: Timestamp) -> Result<()>;

    /// Load the identity mapping cache, if one exists.
    fn load_identity_cache(&self) -> Result<Option<IdentityCache>>;

    /// Persist the identity mapping cache.
    fn save_identity_cache(&self, cache: &IdentityCache) -> Result<()>;

    /// Timestamp of the last successful sync cycle.
    fn last_sync(&self) -> Result<Option<Timestamp>>;

    /// Record the timestamp of a successful sync cycle.
    fn set_last_sync(&self, at: Timestamp) -> Result<()>;

    /// The category filter selected in the presentation layer.
    fn selected_category(&self) -> Result<Option<String>>;

    /// Persist the selected category filter.
    fn set_selected_category(&self, category: &str) -> Result<()>;
}

/// Scalar keys, stored together in one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    #[serde(default)]
    last_sync: Option<Timestamp>,
    #[serde(default)]
    selected_category: Option<String>,
}

/// File-backed storage rooted at a data directory.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (creating if needed) a data directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn quotes_path(&self) -> PathBuf {
        self.dir.join("quotes.json")
    }

    fn identity_path(&self) -> PathBuf {
        self.dir.join("identity.json")
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join("meta.json")
    }

    fn read_if_exists(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a temp file in the same directory, then rename.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn load_meta(&self) -> Result<Meta> {
        match Self::read_if_exists(&self.meta_path())? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))
            }
            None => Ok(Meta::default()),
        }
    }

    fn save_meta(&self, meta: &Meta) -> Result<()> {
        let json =
            serde_json::to_string_pretty(meta).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.write_atomic(&self.meta_path(), &json)
    }
}

impl Storage for JsonFileStorage {
    fn load_collection(&self) -> Result<Option<Collection>> {
        let Some(json) = Self::read_if_exists(&self.quotes_path())? else {
            return Ok(None);
        };
        let snapshot = CollectionSnapshot::from_json(&json)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let (collection, dropped) = snapshot.restore();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped duplicate record(s) while loading collection");
        }
        Ok(Some(collection))
    }

    fn save_collection(&self, collection: &Collection, saved_at: Timestamp) -> Result<()> {
        let snapshot = CollectionSnapshot::capture(collection, saved_at);
        let json = snapshot
            .to_json_pretty()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.write_atomic(&self.quotes_path(), &json)
    }

    fn load_identity_cache(&self) -> Result<Option<IdentityCache>> {
        let Some(json) = Self::read_if_exists(&self.identity_path())? else {
            return Ok(None);
        };
        IdentityCache::from_json(&json)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn save_identity_cache(&self, cache: &IdentityCache) -> Result<()> {
        let json = cache
            .to_json()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.write_atomic(&self.identity_path(), &json)
    }

    fn last_sync(&self) -> Result<Option<Timestamp>> {
        Ok(self.load_meta()?.last_sync)
    }

    fn set_last_sync(&self, at: Timestamp) -> Result<()> {
        let mut meta = self.load_meta()?;
        meta.last_sync = Some(at);
        self.save_meta(&meta)
    }

    fn selected_category(&self) -> Result<Option<String>> {
        Ok(self.load_meta()?.selected_category)
    }

    fn set_selected_category(&self, category: &str) -> Result<()> {
        let mut meta = self.load_meta()?;
        meta.selected_category = Some(category.to_string());
        self.save_meta(&meta)
    }
}

/// In-memory storage for tests and embedders.
///
/// Stores the same serialized forms as the file implementation, so tests can
/// assert byte-for-byte stability of the persisted collection.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    collection: Option<String>,
    cache: Option<String>,
    meta: Meta,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw persisted collection JSON, if any.
    pub fn raw_collection(&self) -> Option<String> {
        self.state.lock().unwrap().collection.clone()
    }
}

impl Storage for MemoryStorage {
    fn load_collection(&self) -> Result<Option<Collection>> {
        let state = self.state.lock().unwrap();
        let Some(json) = state.collection.as_deref() else {
            return Ok(None);
        };
        let snapshot =
            CollectionSnapshot::from_json(json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        Ok(Some(snapshot.restore().0))
    }

    fn save_collection(&self, collection: &Collection, saved_at: Timestamp) -> Result<()> {
        let snapshot = CollectionSnapshot::capture(collection, saved_at);
        let json = snapshot
            .to_json_pretty()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.state.lock().unwrap().collection = Some(json);
        Ok(())
    }

    fn load_identity_cache(&self) -> Result<Option<IdentityCache>> {
        let state = self.state.lock().unwrap();
        match state.cache.as_deref() {
            Some(json) => IdentityCache::from_json(json)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    fn save_identity_cache(&self, cache: &IdentityCache) -> Result<()> {
        let json = cache
            .to_json()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.state.lock().unwrap().cache = Some(json);
        Ok(())
    }

    fn last_sync(&self) -> Result<Option<Timestamp>> {
        Ok(self.state.lock().unwrap().meta.last_sync)
    }

    fn set_last_sync(&self, at: Timestamp) -> Result<()> {
        self.state.lock().unwrap().meta.last_sync = Some(at);
        Ok(())
    }

    fn selected_category(&self) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().meta.selected_category.clone())
    }

    fn set_selected_category(&self, category: &str) -> Result<()> {
        self.state.lock().unwrap().meta.selected_category = Some(category.to_string());
        Ok(())
    }
}

/// Random id minter producing `q_<uuid>` identifiers.
#[derive(Debug, Default)]
pub struct UuidMinter;

impl IdMinter for UuidMinter {
    fn mint(&mut self) -> RecordId {
        format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4())
    }
}

/// Render the collection as a pretty-printed JSON array of records.
pub fn export_json(collection: &Collection) -> Result<String> {
    serde_json::to_string_pretty(collection.records())
        .map_err(|e| StorageError::Corrupt(e.to_string()))
}

/// Parse a JSON array of loosely-typed entries into normalized records.
///
/// Returns the surviving records and the count of discarded entries.
pub fn import_records(
    json: &str,
    now: Timestamp,
    minter: &mut dyn IdMinter,
) -> Result<(Vec<Record>, usize)> {
    let raws: Vec<RawRecord> =
        serde_json::from_str(json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    Ok(normalize_batch(raws, now, minter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotesync_engine::SequentialMinter;
    use tempfile::TempDir;

    fn sample_collection() -> Collection {
        let (collection, _) = Collection::from_records(vec![
            Record::new("q_1", "One", "Gen", 1000),
            Record::new("srv_7", "Hello", "Server", 2000),
        ]);
        collection
    }

    #[test]
    fn file_storage_roundtrips_collection() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();

        assert!(storage.load_collection().unwrap().is_none());

        storage.save_collection(&sample_collection(), 3000).unwrap();
        let loaded = storage.load_collection().unwrap().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("srv_7").unwrap().text, "Hello");
    }

    #[test]
    fn file_storage_roundtrips_cache() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();

        let mut cache = IdentityCache::new();
        cache.observe(7, 1000);
        storage.save_identity_cache(&cache).unwrap();

        let loaded = storage.load_identity_cache().unwrap().unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn file_storage_meta_keys() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();

        assert!(storage.last_sync().unwrap().is_none());

        storage.set_last_sync(1234).unwrap();
        storage.set_selected_category("Motivation").unwrap();

        assert_eq!(storage.last_sync().unwrap(), Some(1234));
        assert_eq!(
            storage.selected_category().unwrap().as_deref(),
            Some("Motivation")
        );
        // Both keys live in one file; the second write kept the first
        storage.set_last_sync(5678).unwrap();
        assert_eq!(
            storage.selected_category().unwrap().as_deref(),
            Some("Motivation")
        );
    }

    #[test]
    fn file_storage_rejects_corrupt_collection() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();

        fs::write(dir.path().join("quotes.json"), "{ nope").unwrap();

        assert!(matches!(
            storage.load_collection(),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();

        storage.save_collection(&sample_collection(), 3000).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(names.contains(&"quotes.json".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".tmp")));
    }

    #[test]
    fn memory_storage_roundtrips() {
        let storage = MemoryStorage::new();

        storage.save_collection(&sample_collection(), 3000).unwrap();
        let loaded = storage.load_collection().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);

        storage.set_last_sync(42).unwrap();
        assert_eq!(storage.last_sync().unwrap(), Some(42));
    }

    #[test]
    fn uuid_minter_uses_local_prefix() {
        let mut minter = UuidMinter;
        let a = minter.mint();
        let b = minter.mint();

        assert!(a.starts_with(LOCAL_ID_PREFIX));
        assert_ne!(a, b);
    }

    #[test]
    fn export_import_roundtrip() {
        let collection = sample_collection();
        let json = export_json(&collection).unwrap();

        let mut minter = SequentialMinter::new();
        let (records, discarded) = import_records(&json, 9000, &mut minter).unwrap();

        assert_eq!(discarded, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "q_1"); // existing ids kept
    }

    #[test]
    fn import_normalizes_loose_entries() {
        let json = r#"[
            {"text": "  keep me  "},
            {"text": "", "category": "X"},
            {"text": "tagged", "category": "Wisdom"}
        ]"#;

        let mut minter = SequentialMinter::new();
        let (records, discarded) = import_records(json, 9000, &mut minter).unwrap();

        assert_eq!(discarded, 1);
        assert_eq!(records[0].text, "keep me");
        assert_eq!(records[0].category, "General");
        assert_eq!(records[1].category, "Wisdom");
    }

    #[test]
    fn import_rejects_non_array() {
        let mut minter = SequentialMinter::new();
        let result = import_records(r#"{"not": "an array"}"#, 9000, &mut minter);
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }
}
