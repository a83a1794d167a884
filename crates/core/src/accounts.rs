//! Accounts and the signed-in session
//!
//! Records live in the `users` map keyed by username. Passwords are stored
//! as entered, which is the storage format inherited from the browser build;
//! they are only ever compared in constant time and never leave this module.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config::LoadPolicy;
use crate::errors::{DeckError, Result};
use crate::models::{User, UserRecord, ADMIN_USERNAME};
use crate::repository::{load_collection, require_text, Loaded};
use crate::store::{keys, Storage};
use crate::util::ct_eq;

/// Demo accounts written when no `users` document exists
fn demo_accounts() -> BTreeMap<String, UserRecord> {
    let mut users = BTreeMap::new();
    users.insert(
        ADMIN_USERNAME.to_string(),
        UserRecord {
            password:   "admin123".to_string(),
            created_at: None,
            is_admin:   true,
        },
    );
    users.insert(
        "user".to_string(),
        UserRecord {
            password:   "user123".to_string(),
            created_at: None,
            is_admin:   false,
        },
    );
    users
}

#[derive(Debug)]
pub struct Accounts {
    storage: Storage,
    users:   BTreeMap<String, UserRecord>,
    current: Option<User>,
}

impl Accounts {
    /// Load users and restore the session stored under `currentUser`
    ///
    /// A stored session whose user no longer exists is dropped.
    pub fn load(storage: Storage, policy: LoadPolicy, seed_demo_accounts: bool) -> Result<Self> {
        let users = match load_collection::<BTreeMap<String, UserRecord>>(&storage, keys::USERS, policy)? {
            Loaded::Stored(users) => users,
            Loaded::Missing if seed_demo_accounts => {
                let users = demo_accounts();
                storage.set_json(keys::USERS, &users)?;
                tracing::info!(count = users.len(), "Seeded demo accounts");
                users
            },
            Loaded::Missing => BTreeMap::new(),
        };

        let stored_session = match load_collection::<User>(&storage, keys::CURRENT_USER, policy)? {
            Loaded::Stored(user) => Some(user),
            Loaded::Missing => None,
        };
        let current = match stored_session {
            Some(user) => match users.get(&user.username) {
                Some(record) => Some(User::from_record(&user.username, record)),
                None => {
                    tracing::warn!(username = %user.username, "Dropping session for unknown user");
                    storage.remove(keys::CURRENT_USER)?;
                    None
                },
            },
            None => None,
        };

        tracing::debug!(
            users = users.len(),
            signed_in = current.is_some(),
            "Accounts loaded"
        );
        Ok(Self {
            storage,
            users,
            current,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// The signed-in user, or `Unauthorized`
    pub fn require_user(&self) -> Result<&User> {
        self.current
            .as_ref()
            .ok_or_else(|| DeckError::Unauthorized("sign in first".into()))
    }

    /// The signed-in user if they are an admin, or `Unauthorized`
    pub fn require_admin(&self) -> Result<&User> {
        let user = self.require_user()?;
        if !user.is_admin {
            return Err(DeckError::Unauthorized(format!(
                "'{}' is not an administrator",
                user.username
            )));
        }
        Ok(user)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Create an account and sign it in
    pub fn register(&mut self, username: &str, password: &str) -> Result<User> {
        require_text("username", username)?;
        if password.is_empty() {
            return Err(DeckError::ValidationFailed("password must not be empty".into()));
        }
        if self.users.contains_key(username) {
            return Err(DeckError::DuplicateUser(username.to_string()));
        }

        let record = UserRecord {
            password:   password.to_string(),
            created_at: Some(Utc::now()),
            is_admin:   false,
        };
        let mut users = self.users.clone();
        users.insert(username.to_string(), record.clone());
        self.storage.set_json(keys::USERS, &users)?;

        // The account only counts once its session is stored too
        let user = User::from_record(username, &record);
        if let Err(err) = self.storage.set_json(keys::CURRENT_USER, &user) {
            tracing::warn!(username, error = %err, "Failed to store session, registration rolled back");
            if let Err(restore) = self.storage.set_json(keys::USERS, &self.users) {
                tracing::warn!(error = %restore, "Failed to restore stored users");
            }
            return Err(err);
        }
        self.users = users;
        self.current = Some(user.clone());

        tracing::info!(username, "User registered");
        Ok(user)
    }

    /// Check credentials and sign in
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub fn login(&mut self, username: &str, password: &str) -> Result<User> {
        let record = self
            .users
            .get(username)
            .filter(|record| ct_eq(&record.password, password))
            .ok_or_else(|| {
                tracing::debug!(username, "Login rejected");
                DeckError::InvalidCredentials
            })?;

        let user = User::from_record(username, record);
        tracing::info!(username, admin = user.is_admin, "User signed in");
        self.start_session(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.storage.remove(keys::CURRENT_USER)?;
        if let Some(user) = self.current.take() {
            tracing::info!(username = %user.username, "User signed out");
        }
        Ok(())
    }

    fn start_session(&mut self, user: User) -> Result<User> {
        self.storage.set_json(keys::CURRENT_USER, &user)?;
        self.current = Some(user.clone());
        Ok(user)
    }
}
