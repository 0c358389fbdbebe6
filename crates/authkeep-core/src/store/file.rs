use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;

use super::{StorageError, TokenKey, TokenStore};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Tokens persisted as a flat JSON object keyed by storage name.
///
/// The whole document is rewritten on every mutation so a reload always sees
/// the last write.
pub struct FileTokenStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileTokenStore {
    /// Open the store in `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create token directory {}", data_dir.display()))?;
        let path = data_dir.join(TOKEN_FILE);

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    // A corrupt file holds nothing worth keeping
                    debug!(error = %e, "Discarding unparseable token file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Token file opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, key: TokenKey, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string_pretty(entries).map_err(|e| StorageError::unavailable(key, e))?;
        std::fs::write(&self.path, contents).map_err(|e| StorageError::unavailable(key, e))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        Ok(entries.get(key.storage_name()).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        let previous = entries.insert(key.storage_name().to_string(), value.to_string());
        if let Err(e) = self.persist(key, &entries) {
            match previous {
                Some(old) => entries.insert(key.storage_name().to_string(), old),
                None => entries.remove(key.storage_name()),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: TokenKey) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        let Some(previous) = entries.remove(key.storage_name()) else {
            return Ok(());
        };
        if let Err(e) = self.persist(key, &entries) {
            // The file still holds the token, so memory must too
            entries.insert(key.storage_name().to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
