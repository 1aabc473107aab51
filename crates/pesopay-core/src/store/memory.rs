use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::{hashed_key, SecureStore, StoreResult};

/// In-process secure store.
///
/// Backs tests and headless environments where no OS keychain is available.
/// Applies the same key-name hashing as the keychain backend so physical
/// naming behaves identically everywhere.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStore for MemoryStore {
    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(hashed_key(key), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&hashed_key(key)).cloned())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.remove(&hashed_key(key));
        Ok(())
    }
}
