//! Application state
//!
//! `App` is the single owner of the store handle, the repositories and the
//! session. The presentation layer keeps a reference to it and re-reads
//! collections after each call instead of holding its own copies.

use crate::accounts::Accounts;
use crate::config::{Config, StoreBackend};
use crate::errors::Result;
use crate::models::Prompt;
use crate::repository::{PromptRepository, SquareCatalogue};
use crate::store::{SqliteStore, Storage};

#[derive(Debug)]
pub struct App {
    config:   Config,
    storage:  Storage,
    accounts: Accounts,
    prompts:  PromptRepository,
    square:   SquareCatalogue,
}

impl App {
    /// Open the configured backend and load every collection
    pub fn open(config: Config) -> Result<Self> {
        let storage = match config.backend {
            StoreBackend::Sqlite => Storage::new(SqliteStore::open(&config.db_path)?),
            StoreBackend::Memory => Storage::in_memory(),
        };
        Self::with_storage(storage, config)
    }

    /// Load from an already constructed store, ignoring `config.backend`
    pub fn with_storage(storage: Storage, config: Config) -> Result<Self> {
        tracing::debug!(
            backend = storage.backend_name(),
            policy = ?config.load_policy,
            "Application starting"
        );

        let accounts = Accounts::load(storage.clone(), config.load_policy, config.seed_demo_accounts)?;
        let prompts = PromptRepository::load(storage.clone(), config.load_policy)?;
        let square = SquareCatalogue::load(storage.clone(), config.load_policy)?;

        Ok(Self {
            config,
            storage,
            accounts,
            prompts,
            square,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut Accounts {
        &mut self.accounts
    }

    pub fn prompts(&self) -> &PromptRepository {
        &self.prompts
    }

    pub fn prompts_mut(&mut self) -> &mut PromptRepository {
        &mut self.prompts
    }

    pub fn square(&self) -> &SquareCatalogue {
        &self.square
    }

    pub fn square_mut(&mut self) -> &mut SquareCatalogue {
        &mut self.square
    }

    /// Copy a square template into the signed-in user's prompts
    pub fn use_template(&mut self, square_id: &str) -> Result<Prompt> {
        let user_id = self.accounts.require_user()?.username.clone();
        let template = self.square.get(square_id)?;
        self.prompts.use_template(template, &user_id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::errors::DeckError;

    #[test]
    fn test_open_in_memory_seeds_everything() {
        let app = App::open(Config::in_memory()).unwrap();
        assert_eq!(app.storage().backend_name(), "memory");
        assert_eq!(app.accounts().user_count(), 2);
        assert_eq!(app.square().list(None).len(), 3);
        assert!(app.prompts().all().is_empty());
        assert!(app.accounts().current_user().is_none());
    }

    #[test]
    fn test_use_template_requires_session() {
        let mut app = App::open(Config::in_memory()).unwrap();
        assert!(matches!(app.use_template("square-1"), Err(DeckError::Unauthorized(_))));

        app.accounts_mut().login("user", "user123").unwrap();
        let prompt = app.use_template("square-1").unwrap();
        assert_eq!(prompt.user_id, "user");
        assert_eq!(
            prompt.current().content,
            app.square().get("square-1").unwrap().current().content
        );
        assert!(matches!(app.use_template("square-404"), Err(DeckError::NotFound { .. })));
    }

    #[test]
    fn test_sqlite_state_survives_restart() {
        let dir = tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("deck.db"),
            ..Config::default()
        };

        let prompt_id = {
            let mut app = App::open(config.clone()).unwrap();
            app.accounts_mut().register("alice", "pw").unwrap();
            app.prompts_mut()
                .create_prompt("alice", "Greeting", "Mail", "Hello")
                .unwrap()
                .id
        };

        let app = App::open(config).unwrap();
        assert_eq!(
            app.accounts().current_user().map(|u| u.username.clone()),
            Some("alice".to_string())
        );
        let prompt = app.prompts().get_owned(&prompt_id, "alice").unwrap();
        assert_eq!(prompt.current().content, "Hello");
    }
}
