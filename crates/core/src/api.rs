//! Host-facing boundary
//!
//! The presentation layer talks to the core through two calls:
//! - `setup` turns a host config object into an [`App`]
//! - `call` runs one command and always answers with JSON
//!
//! Failures never cross this boundary as `Err`; they become an error object
//! the UI can branch on.

use serde_json::{json, Value};

use crate::app::App;
use crate::commands;
use crate::config::Config;
use crate::errors::{DeckError, Result};
use crate::logging;

/// Build the application from a host config object (`null` = defaults)
///
/// Installs the tracing subscriber with the configured filter when none is
/// installed yet.
pub fn setup(config: Value) -> Result<App> {
    let config = Config::from_value(config)?;
    logging::init(&config.log_filter);
    App::open(config)
}

/// Main entry point for command execution
///
/// # Arguments
/// * `command` - Command name in format "category.action" (e.g., "prompts.list")
/// * `args` - Command arguments as JSON object
///
/// # Returns
/// Command result, or an error object built by [`error_object`]
pub fn call(app: &mut App, command: &str, args: Value) -> Value {
    match commands::dispatch(app, command, args) {
        Ok(result) => result,
        Err(err) => {
            match err.category() {
                "persistence" | "corrupt_data" | "io" | "other" => {
                    tracing::error!(command, error = %err, "Command failed")
                },
                category => tracing::debug!(command, category, error = %err, "Command rejected"),
            }
            error_object(&err)
        },
    }
}

/// Structured error object for the UI
///
/// Fields:
/// - `error`: true (marker that this is an error response)
/// - `message`: user-friendly error message
/// - `category`: error category for logging/handling
pub fn error_object(err: &DeckError) -> Value {
    json!({
        "error": true,
        "message": err.user_message(),
        "category": err.category(),
    })
}

/// Whether a `call` result is an error object
pub fn is_error(value: &Value) -> bool {
    value.get("error").and_then(Value::as_bool).unwrap_or(false)
}
