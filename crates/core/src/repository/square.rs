//! Square catalogue
//!
//! Shared templates plus the category list they are filed under. Every
//! template's category is always present in the list: upserts register new
//! categories and a category in use cannot be removed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{enforce_or_repair, load_collection, require_text, Loaded};
use crate::config::LoadPolicy;
use crate::errors::{DeckError, Result};
use crate::models::{PromptVersion, SquarePrompt};
use crate::store::{keys, Storage};

const KIND: &str = "Square prompt";

/// Admin input for creating or replacing a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquarePromptDraft {
    /// Existing id to replace; a fresh one is issued when absent
    #[serde(default)]
    pub id:              Option<String>,
    pub title:           String,
    pub category:        String,
    pub versions:        Vec<PromptVersion>,
    #[serde(default)]
    pub current_version: usize,
}

/// Templates shown the first time the catalogue is opened
pub fn default_square_prompts() -> Vec<SquarePrompt> {
    vec![
        SquarePrompt {
            id:              "square-1".into(),
            title:           "Viral Social Post Writer".into(),
            category:        "Content Creation".into(),
            versions:        vec![PromptVersion::new(
                1,
                "Standard",
                "You are a professional social media creator. Write a post that is likely to go viral...",
            )],
            current_version: 0,
        },
        SquarePrompt {
            id:              "square-2".into(),
            title:           "React Component Assistant".into(),
            category:        "Code Development".into(),
            versions:        vec![PromptVersion::new(
                1,
                "Complete",
                "As a senior React developer, generate a modern, responsive user card component...",
            )],
            current_version: 0,
        },
        SquarePrompt {
            id:              "square-3".into(),
            title:           "Marketing Copy Optimizer".into(),
            category:        "Marketing Copy".into(),
            versions:        vec![PromptVersion::new(
                1,
                "Optimized",
                "As a marketing copy expert, improve the following product copy to raise conversion...",
            )],
            current_version: 0,
        },
    ]
}

pub fn default_square_categories() -> Vec<String> {
    [
        "Content Creation",
        "Code Development",
        "Marketing Copy",
        "Education",
        "Everyday Helper",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug)]
pub struct SquareCatalogue {
    storage:    Storage,
    prompts:    Vec<SquarePrompt>,
    categories: Vec<String>,
}

impl SquareCatalogue {
    /// Load the catalogue, seeding and persisting defaults for absent keys
    pub fn load(storage: Storage, policy: LoadPolicy) -> Result<Self> {
        let (mut prompts, seed_prompts) =
            match load_collection::<Vec<SquarePrompt>>(&storage, keys::SQUARE_PROMPTS, policy)? {
                Loaded::Stored(prompts) => (prompts, false),
                Loaded::Missing => (default_square_prompts(), true),
            };
        let (mut categories, seed_categories) =
            match load_collection::<Vec<String>>(&storage, keys::SQUARE_CATEGORIES, policy)? {
                Loaded::Stored(categories) => (categories, false),
                Loaded::Missing => (default_square_categories(), true),
            };

        let mut dirty_prompts = seed_prompts;
        for prompt in &mut prompts {
            let id = prompt.id.clone();
            let validation = prompt.validate();
            dirty_prompts |=
                enforce_or_repair(policy, keys::SQUARE_PROMPTS, &id, validation, || prompt.repair())?;
        }

        let mut dirty_categories = seed_categories;
        for prompt in &prompts {
            if categories.contains(&prompt.category) {
                continue;
            }
            let validation = Err(DeckError::ValidationFailed(format!(
                "square prompt '{}' uses unlisted category '{}'",
                prompt.id, prompt.category
            )));
            let category = prompt.category.clone();
            enforce_or_repair(policy, keys::SQUARE_CATEGORIES, &prompt.id, validation, || {
                vec![format!("registered category '{}'", category)]
            })?;
            categories.push(prompt.category.clone());
            dirty_categories = true;
        }

        if dirty_prompts {
            storage.set_json(keys::SQUARE_PROMPTS, &prompts)?;
        }
        if dirty_categories {
            storage.set_json(keys::SQUARE_CATEGORIES, &categories)?;
        }

        tracing::debug!(
            prompts = prompts.len(),
            categories = categories.len(),
            seeded = seed_prompts || seed_categories,
            "Square catalogue loaded"
        );
        Ok(Self {
            storage,
            prompts,
            categories,
        })
    }

    /// Templates, optionally narrowed to one category (`None` = all)
    pub fn list(&self, category: Option<&str>) -> Vec<&SquarePrompt> {
        self.prompts
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }

    pub fn list_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Result<&SquarePrompt> {
        self.prompts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DeckError::not_found(KIND, id))
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        require_text("category", name)?;
        if self.categories.iter().any(|c| c == name) {
            return Err(DeckError::ValidationFailed(format!(
                "category '{}' already exists",
                name
            )));
        }

        let mut categories = self.categories.clone();
        categories.push(name.to_string());
        self.storage.set_json(keys::SQUARE_CATEGORIES, &categories)?;
        self.categories = categories;

        tracing::debug!(category = name, "Square category added");
        Ok(())
    }

    /// Remove the category at `index`, refusing while a template uses it
    pub fn remove_category(&mut self, index: usize) -> Result<String> {
        let Some(name) = self.categories.get(index).cloned() else {
            return Err(DeckError::InvalidIndex {
                index,
                len: self.categories.len(),
            });
        };
        let in_use = self.prompts.iter().filter(|p| p.category == name).count();
        if in_use > 0 {
            return Err(DeckError::ValidationFailed(format!(
                "category '{}' is used by {} square prompt(s)",
                name, in_use
            )));
        }

        let mut categories = self.categories.clone();
        categories.remove(index);
        self.storage.set_json(keys::SQUARE_CATEGORIES, &categories)?;
        self.categories = categories;

        tracing::debug!(category = %name, "Square category removed");
        Ok(name)
    }

    /// Insert a new template or replace the one with the draft's id
    pub fn upsert(&mut self, draft: SquarePromptDraft) -> Result<SquarePrompt> {
        require_text("category", &draft.category)?;

        let id = match draft.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => format!("square-{}", Uuid::new_v4()),
        };
        let prompt = SquarePrompt {
            id,
            title: draft.title,
            category: draft.category,
            versions: draft.versions,
            current_version: draft.current_version,
        };
        prompt.validate()?;

        let mut prompts = self.prompts.clone();
        match prompts.iter_mut().find(|p| p.id == prompt.id) {
            Some(existing) => *existing = prompt.clone(),
            None => prompts.push(prompt.clone()),
        }

        let registers_category = !self.categories.contains(&prompt.category);
        let mut categories = self.categories.clone();
        if registers_category {
            categories.push(prompt.category.clone());
            self.storage.set_json(keys::SQUARE_CATEGORIES, &categories)?;
        }
        if let Err(err) = self.storage.set_json(keys::SQUARE_PROMPTS, &prompts) {
            if registers_category {
                // Keep the stored category list in step with the unchanged prompts
                if let Err(restore) = self.storage.set_json(keys::SQUARE_CATEGORIES, &self.categories) {
                    tracing::warn!(
                        error = %restore,
                        "Failed to restore stored square categories, store and memory differ"
                    );
                }
            }
            return Err(err);
        }
        self.prompts = prompts;
        self.categories = categories;

        tracing::debug!(square_id = %prompt.id, category = %prompt.category, "Square prompt saved");
        Ok(prompt)
    }

    pub fn delete(&mut self, id: &str) -> Result<SquarePrompt> {
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DeckError::not_found(KIND, id))?;

        let mut prompts = self.prompts.clone();
        let removed = prompts.remove(index);
        self.storage.set_json(keys::SQUARE_PROMPTS, &prompts)?;
        self.prompts = prompts;

        tracing::debug!(square_id = id, "Square prompt deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn catalogue() -> (Storage, SquareCatalogue) {
        let storage = Storage::in_memory();
        let square = SquareCatalogue::load(storage.clone(), LoadPolicy::Repair).unwrap();
        (storage, square)
    }

    fn draft(id: Option<&str>, category: &str) -> SquarePromptDraft {
        SquarePromptDraft {
            id:              id.map(String::from),
            title:           "Tutor".into(),
            category:        category.into(),
            versions:        vec![PromptVersion::new(1, "Default", "Explain step by step")],
            current_version: 0,
        }
    }

    #[test]
    fn test_seeds_defaults_once() {
        let (storage, square) = catalogue();
        assert_eq!(square.list(None).len(), 3);
        assert_eq!(square.list_categories().len(), 5);

        let stored: Vec<SquarePrompt> = storage.get_json(keys::SQUARE_PROMPTS).unwrap().unwrap();
        assert_eq!(stored, default_square_prompts());

        // An emptied catalogue stays empty on the next load
        storage.set_json(keys::SQUARE_PROMPTS, &Vec::<SquarePrompt>::new()).unwrap();
        let square = SquareCatalogue::load(storage, LoadPolicy::Strict).unwrap();
        assert!(square.list(None).is_empty());
    }

    #[test]
    fn test_list_by_category() {
        let (_, square) = catalogue();
        let code = square.list(Some("Code Development"));
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].id, "square-2");
        assert!(square.list(Some("Education")).is_empty());
    }

    #[test]
    fn test_add_and_remove_category() {
        let (storage, mut square) = catalogue();

        square.add_category("Research").unwrap();
        assert!(square.add_category("Research").is_err());
        assert!(square.add_category("  ").is_err());

        let index = square.list_categories().iter().position(|c| c == "Research").unwrap();
        assert_eq!(square.remove_category(index).unwrap(), "Research");

        let stored: Vec<String> = storage.get_json(keys::SQUARE_CATEGORIES).unwrap().unwrap();
        assert_eq!(stored, default_square_categories());
    }

    #[test]
    fn test_remove_category_in_use_or_out_of_range() {
        let (_, mut square) = catalogue();

        let err = square.remove_category(0).unwrap_err();
        assert!(matches!(err, DeckError::ValidationFailed(_)));
        assert!(matches!(
            square.remove_category(99),
            Err(DeckError::InvalidIndex { index: 99, len: 5 })
        ));
        assert_eq!(square.list_categories().len(), 5);
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let (_, mut square) = catalogue();

        let created = square.upsert(draft(None, "Research")).unwrap();
        assert!(created.id.starts_with("square-"));
        assert!(square.list_categories().contains(&"Research".to_string()));
        assert_eq!(square.list(None).len(), 4);

        let mut replacement = draft(Some(&created.id), "Education");
        replacement.title = "Math Tutor".into();
        let replaced = square.upsert(replacement).unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(square.list(None).len(), 4);
        assert_eq!(square.get(&created.id).unwrap().title, "Math Tutor");
    }

    #[test]
    fn test_upsert_validates_versions() {
        let (_, mut square) = catalogue();

        let mut empty = draft(None, "Education");
        empty.versions.clear();
        assert!(square.upsert(empty).is_err());

        let mut out_of_range = draft(None, "Education");
        out_of_range.current_version = 2;
        assert!(square.upsert(out_of_range).is_err());
        assert_eq!(square.list(None).len(), 3);
    }

    #[test]
    fn test_failed_upsert_restores_category_list() {
        let seeded = Storage::in_memory();
        SquareCatalogue::load(seeded.clone(), LoadPolicy::Repair).unwrap();
        let used: usize = [keys::SQUARE_PROMPTS, keys::SQUARE_CATEGORIES]
            .iter()
            .map(|key| key.len() + seeded.get_raw(key).unwrap().unwrap().len())
            .sum();

        // Room for one more category, not for a large template
        let storage = Storage::new(MemoryStore::with_quota(used + 200));
        let mut square = SquareCatalogue::load(storage.clone(), LoadPolicy::Repair).unwrap();

        let mut big = draft(None, "Research");
        big.versions[0].content = "x".repeat(5000);
        let err = square.upsert(big).unwrap_err();
        assert_eq!(err.category(), "persistence");

        assert_eq!(square.list(None).len(), 3);
        assert_eq!(square.list_categories(), default_square_categories().as_slice());
        let stored: Vec<String> = storage.get_json(keys::SQUARE_CATEGORIES).unwrap().unwrap();
        assert_eq!(stored, default_square_categories());
    }

    #[test]
    fn test_delete_square_prompt() {
        let (storage, mut square) = catalogue();

        let removed = square.delete("square-1").unwrap();
        assert_eq!(removed.id, "square-1");
        assert!(square.get("square-1").is_err());
        assert!(matches!(square.delete("square-1"), Err(DeckError::NotFound { .. })));

        let reloaded = SquareCatalogue::load(storage, LoadPolicy::Strict).unwrap();
        assert_eq!(reloaded.list(None).len(), 2);
    }

    #[test]
    fn test_load_registers_unlisted_categories() {
        let storage = Storage::in_memory();
        storage.set_json(keys::SQUARE_CATEGORIES, &vec!["Only".to_string()]).unwrap();
        storage.set_json(keys::SQUARE_PROMPTS, &default_square_prompts()).unwrap();

        assert!(SquareCatalogue::load(storage.clone(), LoadPolicy::Strict).is_err());

        let square = SquareCatalogue::load(storage.clone(), LoadPolicy::Repair).unwrap();
        assert_eq!(square.list_categories().len(), 4);
        let stored: Vec<String> = storage.get_json(keys::SQUARE_CATEGORIES).unwrap().unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[test]
    fn test_corrupt_catalogue_reseeds_under_repair() {
        let storage = Storage::in_memory();
        storage.set_raw(keys::SQUARE_PROMPTS, "not json").unwrap();

        assert!(SquareCatalogue::load(storage.clone(), LoadPolicy::Strict).is_err());
        let square = SquareCatalogue::load(storage, LoadPolicy::Repair).unwrap();
        assert_eq!(square.list(None).len(), 3);
    }
}
