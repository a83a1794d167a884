//! Persistent key/value store
//!
//! Every collection lives under one key as a JSON document and is rewritten
//! in full on each mutation. Backends only move strings; JSON encode/decode
//! happens in [`Storage`].

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{DeckError, Result};

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Keys used by the application, matching the browser local storage layout
pub mod keys {
    pub const CURRENT_USER: &str = "currentUser";
    pub const USERS: &str = "users";
    pub const PROMPTS: &str = "prompts";
    pub const SQUARE_PROMPTS: &str = "squarePrompts";
    /// Legacy key, personal categories are derived and never written here
    pub const CATEGORIES: &str = "categories";
    pub const SQUARE_CATEGORIES: &str = "squareCategories";
}

/// Synchronous string key/value backend
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Cloneable JSON view over a [`KeyValueStore`]
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl Storage {
    pub fn new<S: KeyValueStore + 'static>(backend: S) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Ephemeral storage, mostly for tests
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Read and decode a value
    ///
    /// Absent keys are `Ok(None)`. A value that is not valid JSON for `T`
    /// is reported as [`DeckError::CorruptData`]; callers pick the policy.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DeckError::CorruptData {
                key:    key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Encode and overwrite a value
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)?;
        tracing::trace!(key, bytes = json.len(), "Stored value");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    /// Raw access, used when repairing or inspecting stored text
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.backend.get(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.backend.set(key, value)
    }
}
