//! Durable key-value storage for visitor state.
//!
//! Stores persist by overwriting a whole value under a logical key after
//! every mutation. Reads are fail-open: a missing key, an unreadable backend,
//! or a malformed value all look like "nothing saved yet".
//!
//! # Keys
//!
//! | key        | value                                  |
//! |------------|----------------------------------------|
//! | `cart`     | JSON array of `{product, quantity}`    |
//! | `wishlist` | JSON array of products                 |
//! | `theme`    | `light` or `dark`                      |
//! | `language` | `en` or `ar`                           |
//!
//! # Adapters
//!
//! - [`MemoryStorage`] - plain map, used by tests and the CLI
//! - [`SessionStorage`] - snapshot of the visitor's tower-sessions record

pub mod session;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use session::SessionStorage;

/// Logical storage keys.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";

    /// Every key a visitor snapshot carries.
    pub const ALL: [&str; 4] = [CART, WISHLIST, THEME, LANGUAGE];
}

/// Errors raised by storage writes.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed, string-valued durable store.
pub trait KeyValueStorage {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend rejects the write.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Read and deserialize a JSON value, treating malformed data as absent.
pub fn load_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding malformed stored value");
            None
        }
    }
}

/// Serialize and write a JSON value. Failures are logged and swallowed.
pub fn save_json<T: Serialize + ?Sized>(storage: &mut dyn KeyValueStorage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialize {
            key: key.to_owned(),
            source,
        })
        .and_then(|raw| storage.set(key, raw));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist value");
    }
}

/// Read a plain (non-JSON) value and parse it, treating bad input as absent.
pub fn load_parsed<T: std::str::FromStr>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Discarding unrecognized stored value");
    }
    parsed
}

/// Write a plain (non-JSON) value. Failures are logged and swallowed.
pub fn save_plain(storage: &mut dyn KeyValueStorage, key: &str, value: &impl ToString) {
    if let Err(e) = storage.set(key, value.to_string()) {
        tracing::warn!(key, error = %e, "Failed to persist value");
    }
}

/// In-memory storage that remembers which keys were written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    dirty: BTreeSet<String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without marking it dirty.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_owned(), value.into());
        self
    }

    /// Keys written since creation, in sorted order.
    pub fn dirty_keys(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Drain the written entries, leaving the storage clean.
    pub fn take_dirty(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|key| {
                let value = self.entries.get(&key)?.clone();
                Some((key, value))
            })
            .collect()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        self.dirty.insert(key.to_owned());
        Ok(())
    }
}
