//! promptdeck_core: storage and business rules for a prompt library
//!
//! Users keep personal prompts with named versions, browse a shared "square"
//! of templates curated by admins, and copy templates into their own library.
//! Features:
//! - Accounts with a persisted session (register, login, logout)
//! - Personal prompts with version history (add, switch, rename, delete)
//! - Square catalogue with admin-managed categories
//! - Pluggable key/value persistence (SQLite or in-memory)
//!
//! ## Architecture
//!
//! - **store**: JSON documents under fixed keys, one backend trait
//! - **repository / accounts**: in-memory collections that write through to
//!   the store and roll back when a write fails
//! - **commands / api**: "category.action" registry the UI calls with JSON

pub mod accounts;
pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod repository;
pub mod store;
pub mod util;

pub use app::App;
pub use config::{Config, LoadPolicy, StoreBackend};
pub use errors::{DeckError, Result};
pub use models::{Prompt, PromptVersion, SquarePrompt, User};
pub use repository::{PromptRepository, SquareCatalogue, SquarePromptDraft};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, Storage};
