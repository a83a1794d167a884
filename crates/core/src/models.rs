//! Entity model
//!
//! Field names serialize in camelCase so documents written by the browser build
//! load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DeckError, Result};

/// Name given to the first version of every new prompt
pub const INITIAL_VERSION_NAME: &str = "Initial";

/// Username that carries the admin flag when demo accounts are seeded
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVersion {
    pub id:      String,
    pub name:    String,
    pub content: String,
}

impl PromptVersion {
    pub fn new(seq: u32, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id:      format!("v{}", seq),
            name:    name.into(),
            content: content.into(),
        }
    }

    /// Numeric part of a `vN` id, if it has one
    pub fn seq(&self) -> Option<u32> {
        self.id.strip_prefix('v').and_then(|n| n.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id:              String,
    pub title:           String,
    pub category:        String,
    pub user_id:         String,
    pub versions:        Vec<PromptVersion>,
    pub current_version: usize,
    pub created_at:      DateTime<Utc>,
    pub updated_at:      DateTime<Utc>,
    /// Highest version sequence ever issued, so deleted ids are not reused
    #[serde(default)]
    pub version_seq:     u32,
}

impl Prompt {
    /// A fresh prompt holding a single version
    pub fn new(
        id: String,
        user_id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            category: category.into(),
            user_id: user_id.into(),
            versions: vec![PromptVersion::new(1, INITIAL_VERSION_NAME, content)],
            current_version: 0,
            created_at: now,
            updated_at: now,
            version_seq: 1,
        }
    }

    /// The version selected by `current_version`
    pub fn current(&self) -> &PromptVersion {
        &self.versions[self.current_version]
    }

    pub fn current_mut(&mut self) -> &mut PromptVersion {
        &mut self.versions[self.current_version]
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Issue the next `vN` sequence number
    ///
    /// Fails once `u32::MAX` has been issued, which only edited storage reaches.
    pub fn next_version_seq(&mut self) -> Result<u32> {
        let highest = self
            .versions
            .iter()
            .filter_map(PromptVersion::seq)
            .max()
            .unwrap_or(0);
        let next = self.version_seq.max(highest).checked_add(1).ok_or_else(|| {
            DeckError::ValidationFailed(format!(
                "prompt '{}' has no version ids left to issue",
                self.id
            ))
        })?;
        self.version_seq = next;
        Ok(next)
    }

    /// Check the version-list invariants
    pub fn validate(&self) -> Result<()> {
        check_versions(&self.id, &self.versions, self.current_version)
    }

    /// Best-effort fix of externally edited data
    ///
    /// Returns a description of every change made; empty when the prompt was
    /// already valid.
    pub fn repair(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();

        if self.versions.is_empty() {
            self.versions.push(PromptVersion::new(1, INITIAL_VERSION_NAME, ""));
            fixes.push("added empty initial version".to_string());
        }
        if self.current_version >= self.versions.len() {
            fixes.push(format!(
                "clamped currentVersion {} to {}",
                self.current_version,
                self.versions.len() - 1
            ));
            self.current_version = self.versions.len() - 1;
        }

        let highest = self
            .versions
            .iter()
            .filter_map(PromptVersion::seq)
            .max()
            .unwrap_or(0);
        if self.version_seq < highest {
            self.version_seq = highest;
        }

        fixes
    }
}

/// Shared template shown in the square
///
/// Same shape as [`Prompt`] without ownership or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquarePrompt {
    pub id:              String,
    pub title:           String,
    pub category:        String,
    pub versions:        Vec<PromptVersion>,
    pub current_version: usize,
}

impl SquarePrompt {
    pub fn current(&self) -> &PromptVersion {
        &self.versions[self.current_version]
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DeckError::ValidationFailed("title must not be empty".into()));
        }
        check_versions(&self.id, &self.versions, self.current_version)
    }

    pub fn repair(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();
        if self.versions.is_empty() {
            self.versions.push(PromptVersion::new(1, INITIAL_VERSION_NAME, ""));
            fixes.push("added empty initial version".to_string());
        }
        if self.current_version >= self.versions.len() {
            fixes.push(format!("clamped currentVersion {}", self.current_version));
            self.current_version = self.versions.len() - 1;
        }
        fixes
    }
}

fn check_versions(id: &str, versions: &[PromptVersion], current: usize) -> Result<()> {
    if versions.is_empty() {
        return Err(DeckError::ValidationFailed(format!(
            "prompt '{}' has no versions",
            id
        )));
    }
    if current >= versions.len() {
        return Err(DeckError::ValidationFailed(format!(
            "prompt '{}' selects version {} of {}",
            id,
            current,
            versions.len()
        )));
    }
    Ok(())
}

/// Stored account record, keyed by username in the `users` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub password:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_admin:   bool,
}

/// Signed-in user as exposed to callers and stored under `currentUser`
///
/// Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username:   String,
    #[serde(default)]
    pub is_admin:   bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_record(username: &str, record: &UserRecord) -> Self {
        Self {
            username:   username.to_string(),
            is_admin:   record.is_admin,
            created_at: record.created_at,
        }
    }
}
