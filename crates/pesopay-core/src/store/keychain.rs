use keyring::Entry;
use serde_json::Value;
use tracing::debug;

use super::{hashed_key, SecureStore, StoreError, StoreResult};

/// Keychain service name shared by all entries
const SERVICE_NAME: &str = "com.pesopay.client";

/// Secure store backed by the OS keychain.
///
/// One keychain entry per hashed logical key. The keychain encrypts values
/// at rest; this type only serializes them and obfuscates the entry names.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> StoreResult<Entry> {
        Entry::new(&self.service, &hashed_key(key))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureStore for KeyringStore {
    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let serialized = serde_json::to_string(value)?;
        self.entry(key)?
            .set_password(&serialized)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        match self.entry(key)?.get_password() {
            Ok(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            // Idempotent: deleting an absent key succeeds
            Err(keyring::Error::NoEntry) => {
                debug!("delete on absent keychain entry");
                Ok(())
            }
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}
