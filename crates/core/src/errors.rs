//! Error types for promptdeck
//!
//! One error enum covers every layer (store, repositories, accounts and the
//! command API) so a failed user action always reports a message plus a
//! stable category the presentation layer can branch on.

use thiserror::Error;

/// Result type alias for promptdeck operations
pub type Result<T> = std::result::Result<T, DeckError>;

/// Main error type for promptdeck
#[derive(Debug, Error)]
pub enum DeckError {
    /// An operation referenced an id that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Input rejected before any state was touched
    #[error("Validation error: {0}")]
    ValidationFailed(String),

    /// Registration with a username that is already taken
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Unknown user or wrong password (deliberately indistinguishable)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session, or the session lacks the required role
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Version index outside `0..len`
    #[error("Version index {index} out of range (prompt has {len} versions)")]
    InvalidIndex { index: usize, len: usize },

    /// Attempt to delete the only remaining version of a prompt
    #[error("Prompt '{0}' must keep at least one version")]
    LastVersion(String),

    /// A stored value could not be decoded
    #[error("Corrupt data under key '{key}': {reason}")]
    CorruptData { key: String, reason: String },

    /// Backend refused a write (quota, closed store, ...)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// SQLite backend error
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

impl From<String> for DeckError {
    fn from(err: String) -> Self {
        DeckError::Other(err)
    }
}

impl From<&str> for DeckError {
    fn from(err: &str) -> Self {
        DeckError::Other(err.to_string())
    }
}

impl DeckError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DeckError::NotFound { kind, id: id.into() }
    }

    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        DeckError::InvalidArgs {
            command: command.to_string(),
            reason:  reason.into(),
        }
    }

    /// Get user-friendly error message for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            DeckError::CommandNotFound(cmd) => {
                format!(
                    "Command '{}' not found. Call 'commands' for the available list.",
                    cmd
                )
            },
            DeckError::NotFound { kind, .. } => {
                format!("The requested {} no longer exists.", kind.to_lowercase())
            },
            DeckError::LastVersion(_) => "A prompt must keep at least one version.".to_string(),
            DeckError::DatabaseError(err) => {
                format!("Could not save your changes: {}", err)
            },
            DeckError::Persistence(msg) => {
                format!("Could not save your changes: {}", msg)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging and UI branching
    pub fn category(&self) -> &'static str {
        match self {
            DeckError::NotFound { .. } => "not_found",
            DeckError::ValidationFailed(_) => "validation",
            DeckError::DuplicateUser(_) => "duplicate_user",
            DeckError::InvalidCredentials => "auth",
            DeckError::Unauthorized(_) => "auth",
            DeckError::InvalidIndex { .. } => "validation",
            DeckError::LastVersion(_) => "validation",
            DeckError::CorruptData { .. } => "corrupt_data",
            DeckError::Persistence(_) => "persistence",
            DeckError::DatabaseError(_) => "persistence",
            DeckError::SerdeError(_) => "serialization",
            DeckError::IoError(_) => "io",
            DeckError::ConfigError(_) => "config",
            DeckError::CommandNotFound(_) => "command",
            DeckError::InvalidArgs { .. } => "arguments",
            DeckError::Other(_) => "other",
        }
    }
}
