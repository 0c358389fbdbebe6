use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{StorageError, TokenKey, TokenStore};

/// In-process token store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<TokenKey, String>>,
    failing: Mutex<Failures>,
}

#[derive(Debug, Default)]
struct Failures {
    all: bool,
    sets: HashSet<TokenKey>,
    removes: HashSet<TokenKey>,
}

#[derive(Clone, Copy)]
enum Access {
    Read,
    Write,
    Remove,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: &[(TokenKey, &str)]) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            for (key, value) in tokens {
                entries.insert(*key, value.to_string());
            }
        }
        store
    }

    /// Make every subsequent operation fail, as a disabled storage would.
    pub fn make_unavailable(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.all = true;
        }
    }

    /// Make removal of one key fail while everything else keeps working.
    pub fn fail_removes_of(&self, key: TokenKey) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.removes.insert(key);
        }
    }

    /// Make writes of one key fail while everything else keeps working.
    pub fn fail_sets_of(&self, key: TokenKey) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.sets.insert(key);
        }
    }

    fn check(&self, key: TokenKey, access: Access) -> Result<(), StorageError> {
        let failing = self
            .failing
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        let targeted = match access {
            Access::Read => false,
            Access::Write => failing.sets.contains(&key),
            Access::Remove => failing.removes.contains(&key),
        };
        if failing.all || targeted {
            return Err(StorageError::unavailable(key, "storage disabled"));
        }
        Ok(())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StorageError> {
        self.check(key, Access::Read)?;
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StorageError> {
        self.check(key, Access::Write)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: TokenKey) -> Result<(), StorageError> {
        self.check(key, Access::Remove)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::unavailable(key, e))?;
        entries.remove(&key);
        Ok(())
    }
}
