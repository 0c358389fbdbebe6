use keyring::Entry;
use tracing::debug;

use super::{StorageError, TokenKey, TokenStore};

/// Keychain service name; each token is one account under it.
const SERVICE_NAME: &str = "authkeep";

/// Tokens stored in the OS keychain.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a distinct keychain service, e.g. one per API base URL.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: TokenKey) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key.storage_name()).map_err(|e| StorageError::unavailable(key, e))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::unavailable(key, e)),
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::unavailable(key, e))
    }

    fn remove(&self, key: TokenKey) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(%key, "No keychain entry to remove");
                Ok(())
            }
            Err(e) => Err(StorageError::unavailable(key, e)),
        }
    }
}
