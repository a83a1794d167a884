//! Command registry and dispatch system
//!
//! This module provides a static registry of commands the presentation layer
//! calls. Commands are registered as "category.action" (e.g.,
//! "prompts.create", "square.list") and dispatched to handler functions that
//! receive the application state plus JSON arguments.
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(app: &mut App, args: Value) -> Result<Value>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::app::App;
use crate::errors::{DeckError, Result};

pub mod auth;
pub mod prompts;
pub mod square;

/// Type alias for command handler functions
///
/// All command handlers take the application state and a JSON Value
/// (arguments) and return a Result<Value>
pub type CommandHandler = fn(&mut App, Value) -> Result<Value>;

/// Static command registry
///
/// Maps command names to handler functions. Initialized lazily on first access.
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Health check
    map.insert("ping", ping as CommandHandler);
    map.insert("commands", commands as CommandHandler);

    // Accounts
    map.insert("auth.register", auth::register as CommandHandler);
    map.insert("auth.login", auth::login as CommandHandler);
    map.insert("auth.logout", auth::logout as CommandHandler);
    map.insert("auth.current", auth::current as CommandHandler);

    // Personal prompts
    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.get", prompts::get as CommandHandler);
    map.insert("prompts.create", prompts::create as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.switch_version", prompts::switch_version as CommandHandler);
    map.insert("prompts.add_version", prompts::add_version as CommandHandler);
    map.insert("prompts.delete_version", prompts::delete_version as CommandHandler);
    map.insert("prompts.rename_version", prompts::rename_version as CommandHandler);
    map.insert("prompts.categories", prompts::categories as CommandHandler);
    map.insert("prompts.use_template", prompts::use_template as CommandHandler);

    // Square catalogue
    map.insert("square.list", square::list as CommandHandler);
    map.insert("square.get", square::get as CommandHandler);
    map.insert("square.categories", square::categories as CommandHandler);
    map.insert("square.add_category", square::add_category as CommandHandler);
    map.insert("square.remove_category", square::remove_category as CommandHandler);
    map.insert("square.upsert", square::upsert as CommandHandler);
    map.insert("square.delete", square::delete as CommandHandler);

    map
});

/// Dispatch a command by name
///
/// Looks up the command in the registry and executes it with the provided arguments.
///
/// # Arguments
/// * `app` - Application state the command operates on
/// * `command` - Command name (e.g., "ping", "prompts.list")
/// * `args` - Command arguments as JSON Value
///
/// # Returns
/// Command result as JSON Value, or error if command not found
pub fn dispatch(app: &mut App, command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => {
            tracing::trace!(command, "Dispatching command");
            handler(app, args)
        },
        None => Err(DeckError::CommandNotFound(command.to_string())),
    }
}

/// List all available commands
///
/// Returns a sorted list of all registered command names.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Required string argument
pub(crate) fn str_arg<'a>(args: &'a Value, command: &str, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DeckError::invalid_args(command, format!("missing '{}'", key)))
}

/// Optional string argument; `null` counts as absent
pub(crate) fn opt_str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Required non-negative integer argument
pub(crate) fn index_arg(args: &Value, command: &str, key: &str) -> Result<usize> {
    args.get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            DeckError::invalid_args(command, format!("'{}' must be a non-negative integer", key))
        })
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - simple test to verify command dispatch works
///
/// Returns the input arguments with an added "pong" field.
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(_app: &mut App, args: Value) -> Result<Value> {
    let mut result = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    result.insert("pong".to_string(), Value::Bool(true));
    Ok(Value::Object(result))
}

/// Registered command names, for hosts that build menus from them
fn commands(_app: &mut App, _args: Value) -> Result<Value> {
    Ok(serde_json::json!({ "commands": list_commands() }))
}
