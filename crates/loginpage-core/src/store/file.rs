use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{StoreError, TokenStore};

/// Store file name in cache directory
const STORE_FILE: &str = "token_store.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredValue {
    pub value: String,
    pub stored_at: DateTime<Utc>,
}

/// Token storage persisted as a JSON map on disk.
///
/// The whole map is rewritten on every change; it only ever holds a handful
/// of keys.
pub struct FileTokenStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl FileTokenStore {
    /// Open the store in `dir`, loading any existing entries.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = dir.as_ref().join(STORE_FILE);
        let entries = Self::load(&path)?;
        debug!(?path, count = entries.len(), "Token store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When a key was last written
    pub fn stored_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).map(|v| v.stored_at))
    }

    fn load(path: &Path) -> Result<HashMap<String, StoredValue>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            warn!(?path, "Token store file is empty, starting fresh");
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &HashMap<String, StoredValue>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).map(|v| v.value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        // Only commit to memory once the file is written
        let mut updated = entries.clone();
        updated.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                stored_at: Utc::now(),
            },
        );
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }
}
