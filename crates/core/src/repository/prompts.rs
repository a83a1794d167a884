//! Personal prompt repository
//!
//! All users' prompts share the `prompts` key; ownership is an exact match on
//! `userId` and every listing filters by it.

use chrono::Utc;

use super::{enforce_or_repair, load_collection, require_text, Loaded};
use crate::config::LoadPolicy;
use crate::errors::{DeckError, Result};
use crate::models::{Prompt, PromptVersion, SquarePrompt};
use crate::store::{keys, Storage};

const KIND: &str = "Prompt";

#[derive(Debug)]
pub struct PromptRepository {
    storage: Storage,
    prompts: Vec<Prompt>,
}

impl PromptRepository {
    /// Load the `prompts` collection
    ///
    /// Under [`LoadPolicy::Repair`] a corrupt document starts an empty
    /// collection and broken prompts are fixed in place; under
    /// [`LoadPolicy::Strict`] either case is an error.
    pub fn load(storage: Storage, policy: LoadPolicy) -> Result<Self> {
        let mut prompts = match load_collection::<Vec<Prompt>>(&storage, keys::PROMPTS, policy)? {
            Loaded::Stored(prompts) => prompts,
            Loaded::Missing => Vec::new(),
        };

        let mut repaired = 0usize;
        for prompt in &mut prompts {
            let id = prompt.id.clone();
            let validation = prompt.validate();
            if enforce_or_repair(policy, keys::PROMPTS, &id, validation, || prompt.repair())? {
                repaired += 1;
            }
            // Brings versionSeq up to date for documents that predate it
            prompt.repair();
        }

        tracing::debug!(count = prompts.len(), repaired, "Prompts loaded");
        Ok(Self { storage, prompts })
    }

    /// Every prompt of every user, in insertion order
    pub fn all(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn get(&self, id: &str) -> Result<&Prompt> {
        self.prompts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DeckError::not_found(KIND, id))
    }

    /// Like [`get`](Self::get), but another user's prompt is reported as missing
    pub fn get_owned(&self, id: &str, user_id: &str) -> Result<&Prompt> {
        self.get(id)
            .ok()
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| DeckError::not_found(KIND, id))
    }

    pub fn list_by_owner(&self, user_id: &str) -> Vec<&Prompt> {
        self.prompts.iter().filter(|p| p.user_id == user_id).collect()
    }

    /// Owner's prompts, optionally narrowed to one category (`None` = all)
    pub fn list_by_owner_in_category(&self, user_id: &str, category: Option<&str>) -> Vec<&Prompt> {
        self.prompts
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }

    /// Distinct categories of the owner's prompts, in first-seen order
    pub fn distinct_categories(&self, user_id: &str) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for prompt in self.list_by_owner(user_id) {
            if !categories.contains(&prompt.category) {
                categories.push(prompt.category.clone());
            }
        }
        categories
    }

    pub fn create_prompt(
        &mut self,
        user_id: &str,
        title: &str,
        category: &str,
        initial_content: &str,
    ) -> Result<Prompt> {
        require_text("userId", user_id)?;
        require_text("title", title)?;

        let prompt = Prompt::new(self.next_id(), user_id, title, category, initial_content);
        let created = prompt.clone();
        self.mutate(|prompts| {
            prompts.push(prompt);
            Ok(())
        })?;

        tracing::debug!(prompt_id = %created.id, user_id, "Prompt created");
        Ok(created)
    }

    /// Overwrite title, category and the content of the current version
    pub fn update_prompt(
        &mut self,
        id: &str,
        title: &str,
        category: &str,
        content: &str,
    ) -> Result<Prompt> {
        require_text("title", title)?;

        let updated = self.mutate_prompt(id, |prompt| {
            prompt.title = title.to_string();
            prompt.category = category.to_string();
            prompt.current_mut().content = content.to_string();
            prompt.touch();
            Ok(())
        })?;

        tracing::debug!(prompt_id = id, version = updated.current_version, "Prompt updated");
        Ok(updated)
    }

    /// Hard delete; confirming with the user is the caller's job
    pub fn delete_prompt(&mut self, id: &str) -> Result<Prompt> {
        let index = self.index_of(id)?;
        let removed = self.mutate(|prompts| Ok(prompts.remove(index)))?;

        tracing::debug!(prompt_id = id, "Prompt deleted");
        Ok(removed)
    }

    /// Select another version; does not count as an edit
    pub fn switch_version(&mut self, id: &str, index: usize) -> Result<Prompt> {
        self.mutate_prompt(id, |prompt| {
            check_index(index, prompt.versions.len())?;
            prompt.current_version = index;
            Ok(())
        })
    }

    /// Append a version and make it current
    pub fn add_version(&mut self, id: &str, name: &str, content: &str) -> Result<Prompt> {
        require_text("version name", name)?;

        let updated = self.mutate_prompt(id, |prompt| {
            let seq = prompt.next_version_seq()?;
            prompt.versions.push(PromptVersion::new(seq, name, content));
            prompt.current_version = prompt.versions.len() - 1;
            prompt.touch();
            Ok(())
        })?;

        tracing::debug!(
            prompt_id = id,
            version_id = %updated.current().id,
            "Version added"
        );
        Ok(updated)
    }

    /// Remove one version, refusing to remove the last one
    ///
    /// `currentVersion` keeps its position and is only clamped when it now
    /// points past the end of the list.
    pub fn delete_version(&mut self, id: &str, index: usize) -> Result<Prompt> {
        let updated = self.mutate_prompt(id, |prompt| {
            if prompt.versions.len() <= 1 {
                return Err(DeckError::LastVersion(prompt.id.clone()));
            }
            check_index(index, prompt.versions.len())?;

            prompt.versions.remove(index);
            if prompt.current_version >= prompt.versions.len() {
                prompt.current_version = prompt.versions.len() - 1;
            }
            prompt.touch();
            Ok(())
        })?;

        tracing::debug!(prompt_id = id, index, remaining = updated.versions.len(), "Version deleted");
        Ok(updated)
    }

    pub fn rename_version(&mut self, id: &str, index: usize, name: &str) -> Result<Prompt> {
        require_text("version name", name)?;

        self.mutate_prompt(id, |prompt| {
            check_index(index, prompt.versions.len())?;
            prompt.versions[index].name = name.to_string();
            prompt.touch();
            Ok(())
        })
    }

    /// Copy a template's current version into a new prompt owned by `user_id`
    ///
    /// The template is only read; the copy shares no data with it.
    pub fn use_template(&mut self, template: &SquarePrompt, user_id: &str) -> Result<Prompt> {
        template.validate()?;

        let created = self.create_prompt(
            user_id,
            &template.title,
            &template.category,
            &template.current().content,
        )?;

        tracing::debug!(
            prompt_id = %created.id,
            template_id = %template.id,
            user_id,
            "Template copied"
        );
        Ok(created)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Millisecond timestamp, bumped until unique in the collection
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        loop {
            let id = candidate.to_string();
            if self.prompts.iter().all(|p| p.id != id) {
                return id;
            }
            candidate += 1;
        }
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DeckError::not_found(KIND, id))
    }

    fn mutate_prompt<F>(&mut self, id: &str, f: F) -> Result<Prompt>
    where
        F: FnOnce(&mut Prompt) -> Result<()>,
    {
        let index = self.index_of(id)?;
        self.mutate(|prompts| {
            let prompt = &mut prompts[index];
            f(prompt)?;
            Ok(prompt.clone())
        })
    }

    /// Run `f`, persist, and roll the collection back if either step fails
    fn mutate<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Prompt>) -> Result<T>,
    {
        let snapshot = self.prompts.clone();
        let outcome = f(&mut self.prompts).and_then(|value| {
            self.storage.set_json(keys::PROMPTS, &self.prompts)?;
            Ok(value)
        });

        if let Err(err) = &outcome {
            if err.category() == "persistence" {
                tracing::warn!(error = %err, "Failed to persist prompts, changes rolled back");
            }
            self.prompts = snapshot;
        }
        outcome
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(DeckError::InvalidIndex { index, len });
    }
    Ok(())
}
