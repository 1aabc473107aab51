//! Secure key-value storage for tokens and session data.
//!
//! This module provides:
//! - `SecureStore`: the storage contract over logical keys and JSON values
//! - `KeyringStore`: OS keychain backend via keyring
//! - `MemoryStore`: in-process backend for tests and headless environments
//!
//! Logical key names are hashed before they reach a backend; value
//! encryption at rest is the backend's responsibility.

pub mod keychain;
pub mod memory;

pub use keychain::KeyringStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Value (de)serialization error
    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Contract for secure storage backends.
///
/// `get` distinguishes a stored JSON `null` (`Ok(Some(Value::Null))`) from
/// an absent key (`Ok(None)`). `delete` is idempotent: removing a key that
/// was never set succeeds.
pub trait SecureStore: Send + Sync {
    /// Persist a JSON value under a logical key
    fn set(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Retrieve the value stored under a logical key
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Remove the entry for a logical key
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Check whether a logical key has a stored entry
    fn has(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl dyn SecureStore {
    /// Serialize any serde value and store it under `key`
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.set(key, &serde_json::to_value(value)?)
    }

    /// Retrieve and deserialize the value stored under `key`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Hash a logical key name for physical storage.
///
/// Key-name obfuscation only: the digest hides what a keychain entry is for,
/// it does not protect the value. Hex-encoded SHA-256, so physical names are
/// stable across runs and platforms.
pub(crate) fn hashed_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
