//! Durable token persistence.
//!
//! This module provides:
//! - `TokenStore`: the key/value surface every component reads tokens through
//! - `FileTokenStore`: JSON document in the platform data directory
//! - `KeyringTokenStore`: OS-level keychain entries via keyring
//! - `MemoryTokenStore`: non-durable, for tests and degraded operation
//!
//! Stores do not look inside tokens. Expiry is the API's business.

pub mod file;
pub mod keychain;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;
pub use memory::MemoryTokenStore;

/// Fixed keys under which tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKey {
    Access,
    Refresh,
    Csrf,
}

impl TokenKey {
    pub const ALL: [TokenKey; 3] = [TokenKey::Access, TokenKey::Refresh, TokenKey::Csrf];

    /// Name of the persisted entry
    pub fn storage_name(&self) -> &'static str {
        match self {
            TokenKey::Access => "token",
            TokenKey::Refresh => "refreshToken",
            TokenKey::Csrf => "csrfToken",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable for {key}: {reason}")]
    Unavailable { key: TokenKey, reason: String },
}

impl StorageError {
    pub fn unavailable(key: TokenKey, reason: impl fmt::Display) -> Self {
        StorageError::Unavailable {
            key,
            reason: reason.to_string(),
        }
    }
}

/// Which backend the composition root should open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl TokenBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" => Some(TokenBackend::File),
            "keyring" | "keychain" => Some(TokenBackend::Keyring),
            "memory" => Some(TokenBackend::Memory),
            _ => None,
        }
    }
}

pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StorageError>;

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: TokenKey) -> Result<(), StorageError>;

    /// True if a non-empty access token is stored. Unreadable storage counts as no token.
    fn has_access_token(&self) -> bool {
        matches!(self.get(TokenKey::Access), Ok(Some(ref token)) if !token.is_empty())
    }

    /// Remove every key in `keys`, attempting all of them even if one fails.
    /// Returns the first failure.
    fn clear(&self, keys: &[TokenKey]) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove(*key) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
