//! In-memory collections kept in sync with the store
//!
//! Each repository owns its collection, rewrites the whole document after
//! every successful mutation and restores the previous in-memory state when
//! that write fails.

use serde::de::DeserializeOwned;

use crate::config::LoadPolicy;
use crate::errors::{DeckError, Result};
use crate::store::Storage;

pub mod prompts;
pub mod square;

pub use prompts::PromptRepository;
pub use square::{SquareCatalogue, SquarePromptDraft};

/// Outcome of reading one collection key
pub(crate) enum Loaded<T> {
    Stored(T),
    /// Key absent, or corrupt and reset under [`LoadPolicy::Repair`]
    Missing,
}

/// Read a collection, applying the load policy to undecodable values
pub(crate) fn load_collection<T: DeserializeOwned>(
    storage: &Storage,
    key: &str,
    policy: LoadPolicy,
) -> Result<Loaded<T>> {
    match storage.get_json::<T>(key) {
        Ok(Some(value)) => Ok(Loaded::Stored(value)),
        Ok(None) => Ok(Loaded::Missing),
        Err(err @ DeckError::CorruptData { .. }) => match policy {
            LoadPolicy::Strict => Err(err),
            LoadPolicy::Repair => {
                tracing::warn!(key, error = %err, "Discarding corrupt stored value");
                Ok(Loaded::Missing)
            },
        },
        Err(err) => Err(err),
    }
}

/// Apply the load policy to an invariant violation found after decoding
pub(crate) fn enforce_or_repair<F>(
    policy: LoadPolicy,
    key: &str,
    id: &str,
    validation: Result<()>,
    repair: F,
) -> Result<bool>
where
    F: FnOnce() -> Vec<String>,
{
    let Err(err) = validation else {
        return Ok(false);
    };
    match policy {
        LoadPolicy::Strict => Err(err),
        LoadPolicy::Repair => {
            for fix in repair() {
                tracing::warn!(key, id, fix = %fix, "Repaired stored entity");
            }
            Ok(true)
        },
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeckError::ValidationFailed(format!("{} must not be empty", field)));
    }
    Ok(())
}
