//! Durable key-value persistence for the workspace.
//!
//! Three independent keys are stored: the raw text input, the serialized
//! record, and the "has analyzed" flag. Writes to one key never touch the
//! others, and a later write to the same key simply replaces the earlier one.

use crate::record::Record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store poisoned by a panicked writer")]
    Poisoned,
}

/// The durable keys, one per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    TextInput,
    AnalysisData,
    HasAnalyzed,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::TextInput => "cosmo_text_input",
            StoreKey::AnalysisData => "cosmo_analysis_data",
            StoreKey::HasAnalyzed => "cosmo_has_analyzed",
        }
    }
}

/// A durable string store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Last value written under `key`, if any.
    async fn load(&self, key: StoreKey) -> Result<Option<String>, PersistError>;

    async fn save(&self, key: StoreKey, value: &str) -> Result<(), PersistError>;

    /// Delete `key`. Removing an absent key is not an error.
    async fn remove(&self, key: StoreKey) -> Result<(), PersistError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a key, without going through the async interface.
    pub fn get(&self, key: StoreKey) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.get(&key).cloned())
    }

    /// Seed a value directly.
    pub fn insert(&self, key: StoreKey, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, value.into());
        }
    }

    pub fn contains(&self, key: StoreKey) -> bool {
        self.get(key).is_some()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: StoreKey) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        Ok(entries.get(&key).cloned())
    }

    async fn save(&self, key: StoreKey, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().map_err(|_| PersistError::Poisoned)?;
        entries.remove(&key);
        Ok(())
    }
}

/// Store backed by a directory, one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, PersistError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.as_str())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: StoreKey) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: StoreKey, value: &str) -> Result<(), PersistError> {
        // Write-then-rename so a crash never leaves a half-written value.
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// What was found in durable storage at workspace open.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub text: Option<String>,
    pub record: RestoredRecord,
}

/// Outcome of restoring the persisted record.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoredRecord {
    /// No record, or the flag is not set.
    Absent,
    Restored(Record),
    /// A record payload was present but could not be parsed.
    Corrupted(String),
}

/// Typed access to the workspace's three keys.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save_text(&self, text: &str) -> Result<(), PersistError> {
        self.store.save(StoreKey::TextInput, text).await
    }

    /// Persist the record payload only.
    pub async fn save_record(&self, record: &Record) -> Result<(), PersistError> {
        let payload = serde_json::to_string(record)?;
        self.store.save(StoreKey::AnalysisData, &payload).await
    }

    /// Persist the record together with the "has analyzed" flag.
    pub async fn save_analysis(&self, record: &Record) -> Result<(), PersistError> {
        self.save_record(record).await?;
        self.store.save(StoreKey::HasAnalyzed, "true").await
    }

    /// Erase the record and the flag. The text input is kept.
    pub async fn clear_analysis(&self) -> Result<(), PersistError> {
        self.store.remove(StoreKey::AnalysisData).await?;
        self.store.remove(StoreKey::HasAnalyzed).await
    }

    /// Read everything needed to resume a session.
    ///
    /// A record is restored only when both the payload and the flag are
    /// present. An unparsable payload is reported as
    /// [`RestoredRecord::Corrupted`]; it is left in place and will be
    /// overwritten by the next successful save.
    pub async fn restore(&self) -> Result<Restored, PersistError> {
        let text = self.store.load(StoreKey::TextInput).await?.filter(|t| !t.is_empty());
        let payload = self.store.load(StoreKey::AnalysisData).await?;
        let flag = self.store.load(StoreKey::HasAnalyzed).await?;

        let record = match (payload, flag.as_deref()) {
            (Some(payload), Some("true")) => parse_record(&payload),
            _ => RestoredRecord::Absent,
        };

        Ok(Restored { text, record })
    }
}

fn parse_record(payload: &str) -> RestoredRecord {
    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return RestoredRecord::Corrupted(e.to_string()),
    };
    match Record::from_payload(&value) {
        Some(record) => RestoredRecord::Restored(record),
        None => RestoredRecord::Corrupted("stored record is not a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let mut record = Record::default();
        record.character.name = "Elira".to_string();
        record.item.kind = "Relic".to_string();
        record
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.load(StoreKey::TextInput).await.unwrap(), None);

        store.save(StoreKey::TextInput, "hello").await.unwrap();
        store.save(StoreKey::TextInput, "hello again").await.unwrap();
        assert_eq!(store.load(StoreKey::TextInput).await.unwrap().as_deref(), Some("hello again"));

        store.remove(StoreKey::TextInput).await.unwrap();
        store.remove(StoreKey::TextInput).await.unwrap();
        assert!(!store.contains(StoreKey::TextInput));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();

        store.save(StoreKey::HasAnalyzed, "true").await.unwrap();
        assert_eq!(store.load(StoreKey::HasAnalyzed).await.unwrap().as_deref(), Some("true"));
        assert_eq!(store.load(StoreKey::TextInput).await.unwrap(), None);

        store.remove(StoreKey::HasAnalyzed).await.unwrap();
        store.remove(StoreKey::HasAnalyzed).await.unwrap();
        assert_eq!(store.load(StoreKey::HasAnalyzed).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store.save(StoreKey::TextInput, "persisted").await.unwrap();
        }
        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.load(StoreKey::TextInput).await.unwrap().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_restore_requires_flag() {
        let store = Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store.clone());
        persistence.save_record(&sample_record()).await.unwrap();

        let restored = persistence.restore().await.unwrap();
        assert_eq!(restored.record, RestoredRecord::Absent);

        store.insert(StoreKey::HasAnalyzed, "true");
        let restored = persistence.restore().await.unwrap();
        assert_eq!(restored.record, RestoredRecord::Restored(sample_record()));
    }

    #[tokio::test]
    async fn test_restore_reports_corruption() {
        let store = Arc::new(MemoryStore::new());
        store.insert(StoreKey::AnalysisData, "{not json");
        store.insert(StoreKey::HasAnalyzed, "true");
        store.insert(StoreKey::TextInput, "kept");

        let restored = Persistence::new(store.clone()).restore().await.unwrap();
        assert!(matches!(restored.record, RestoredRecord::Corrupted(_)));
        assert_eq!(restored.text.as_deref(), Some("kept"));
        // Corrupted entries are left for the next save to overwrite.
        assert!(store.contains(StoreKey::AnalysisData));
    }

    #[tokio::test]
    async fn test_restore_non_object_is_corrupted() {
        let store = Arc::new(MemoryStore::new());
        store.insert(StoreKey::AnalysisData, "\"just a string\"");
        store.insert(StoreKey::HasAnalyzed, "true");

        let restored = Persistence::new(store).restore().await.unwrap();
        assert!(matches!(restored.record, RestoredRecord::Corrupted(_)));
    }

    #[tokio::test]
    async fn test_clear_analysis_keeps_text() {
        let store = Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store.clone());
        persistence.save_text("fragment").await.unwrap();
        persistence.save_analysis(&sample_record()).await.unwrap();

        persistence.clear_analysis().await.unwrap();

        assert!(store.contains(StoreKey::TextInput));
        assert!(!store.contains(StoreKey::AnalysisData));
        assert!(!store.contains(StoreKey::HasAnalyzed));
    }
}
