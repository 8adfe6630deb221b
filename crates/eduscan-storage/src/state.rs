//! In-memory state storage written through to a JSON file

use crate::atomic_writer::AtomicWriter;
use crate::traits::{StateStore, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key-value store backed by a single JSON object on disk.
///
/// Every mutation rewrites the file atomically while the write lock is held,
/// so concurrent writers never interleave their temp files.
pub struct FileStateStore {
    path: PathBuf,
    state: RwLock<BTreeMap<String, String>>,
}

impl FileStateStore {
    /// Open the store, failing if the existing file is not a JSON string map
    pub async fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = Self::load(&path)?;

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Open the store, starting empty if the existing file cannot be parsed
    pub async fn open_or_reset<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match Self::load(&path) {
            Ok(state) => state,
            Err(StorageError::Serialization(e)) => {
                warn!("State file {:?} is unreadable, starting empty: {}", path, e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StorageResult<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| StorageError::Serialization(format!("Failed to load state: {}", e)))
    }

    fn write_file(&self, state: &BTreeMap<String, String>) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::Serialization(format!("Failed to serialize state: {}", e)))?;

        let mut writer = AtomicWriter::new(&self.path)?;
        writer.write(content.as_bytes())?;
        writer.commit()?;

        debug!("Persisted {} state keys to {:?}", state.len(), self.path);
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let state = self.state.read().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.insert(key.to_string(), value);
        self.write_file(&state)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if state.remove(key).is_some() {
            self.write_file(&state)?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let state = self.state.read().await;
        Ok(state.contains_key(key))
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
