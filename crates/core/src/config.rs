//! Runtime configuration
//!
//! Defaults, overridable from a JSON object handed over by the host (the
//! `setup` payload) or from `PROMPTDECK_*` environment variables, with `.env`
//! files honoured through dotenvy.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DeckError, Result};

pub const ENV_DB_PATH: &str = "PROMPTDECK_DB_PATH";
pub const ENV_BACKEND: &str = "PROMPTDECK_BACKEND";
pub const ENV_LOG: &str = "PROMPTDECK_LOG";
pub const ENV_LOAD_POLICY: &str = "PROMPTDECK_LOAD_POLICY";
pub const ENV_SEED_DEMO_ACCOUNTS: &str = "PROMPTDECK_SEED_DEMO_ACCOUNTS";

const APP_DIR: &str = "promptdeck";
const DB_FILE_NAME: &str = "promptdeck.db";

/// Where the key/value documents live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// What to do with stored data that fails to decode or breaks an invariant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Reset corrupt collections to defaults and fix invariant violations
    #[default]
    Repair,
    /// Refuse to open
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub db_path:            PathBuf,
    pub backend:            StoreBackend,
    pub log_filter:         String,
    pub load_policy:        LoadPolicy,
    pub seed_demo_accounts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path:            default_db_path(),
            backend:            StoreBackend::default(),
            log_filter:         "info".to_string(),
            load_policy:        LoadPolicy::default(),
            seed_demo_accounts: true,
        }
    }
}

/// `<data dir>/promptdeck/promptdeck.db`, falling back to the working directory
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DB_FILE_NAME)
}

impl Config {
    /// Ephemeral configuration for tests and previews
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Self::default()
        }
    }

    /// Build from a host-provided JSON object; missing fields keep defaults
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| DeckError::ConfigError(e.to_string()))
    }

    /// Defaults overridden by `.env` and process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `PROMPTDECK_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(backend) = lookup(ENV_BACKEND) {
            config.backend = match backend.to_ascii_lowercase().as_str() {
                "sqlite" => StoreBackend::Sqlite,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(DeckError::ConfigError(format!(
                        "{} must be 'sqlite' or 'memory', got '{}'",
                        ENV_BACKEND, other
                    )))
                },
            };
        }
        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(policy) = lookup(ENV_LOAD_POLICY) {
            config.load_policy = match policy.to_ascii_lowercase().as_str() {
                "repair" => LoadPolicy::Repair,
                "strict" => LoadPolicy::Strict,
                other => {
                    return Err(DeckError::ConfigError(format!(
                        "{} must be 'repair' or 'strict', got '{}'",
                        ENV_LOAD_POLICY, other
                    )))
                },
            };
        }
        if let Some(seed) = lookup(ENV_SEED_DEMO_ACCOUNTS) {
            config.seed_demo_accounts = parse_bool(ENV_SEED_DEMO_ACCOUNTS, &seed)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DeckError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
