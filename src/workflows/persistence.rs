// ABOUTME: Durable per-account workflow records keyed by wallet address
// FileStorage keeps one JSON file per account; MemoryStorage backs tests and demos

use crate::workflows::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Record key for an account, e.g. `workflows_0xA`
pub fn record_key(address: &str) -> String {
    format!("workflows_{address}")
}

/// Raw key/value access to durable records. The store owns serialization.
pub trait WorkflowStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError>;
}

pub struct FileStorage {
    storage_path: PathBuf,
}

impl FileStorage {
    pub fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage_path = storage_path.into();

        // Ensure directory exists
        fs::create_dir_all(&storage_path)?;

        Ok(Self { storage_path })
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Distinct keys always map to distinct files: anything outside `[A-Za-z0-9-]`,
    /// `_` included, is written as `_XX` per byte.
    fn record_file(&self, key: &str) -> PathBuf {
        let mut safe = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                safe.push(char::from(byte));
            } else {
                safe.push_str(&format!("_{byte:02X}"));
            }
        }
        self.storage_path.join(format!("{safe}.json"))
    }
}

impl WorkflowStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_file(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Written to a sibling temp file first so a failed write never leaves half a record
    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.record_file(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved workflow record {:?}", path);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail, as an unreadable backing store would.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail, to exercise persistence error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, contents: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), contents.to_string());
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.lock().ok().and_then(|r| r.get(key).cloned())
    }
}

impl WorkflowStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage is locked".to_string()));
        }
        let records = self
            .records
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        records.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}
