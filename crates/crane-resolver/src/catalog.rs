//! In-memory recipe catalog.

use std::collections::BTreeMap;

use crane_core::recipe::Recipe;
use crane_core::reference::Reference;
use crane_util::errors::{CraneError, CraneResult};

use crate::provider::{PackageIndex, RecipeProvider};

/// Recipes held in memory, keyed by concrete reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    recipes: BTreeMap<Reference, Recipe>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a recipe under a concrete reference, replacing any previous one.
    pub fn export(&mut self, reference: &str, recipe: Recipe) -> CraneResult<Reference> {
        let reference = Reference::parse(reference)?;
        self.insert(reference.clone(), recipe)?;
        Ok(reference)
    }

    /// Like [`MemoryCatalog::export`] for an already parsed reference.
    pub fn insert(&mut self, reference: Reference, recipe: Recipe) -> CraneResult<()> {
        if reference.is_range() {
            return Err(CraneError::MalformedReference {
                reference: reference.to_string(),
                reason: "a recipe needs a concrete version".to_string(),
            });
        }
        self.recipes.insert(reference, recipe);
        Ok(())
    }

    pub fn remove(&mut self, reference: &Reference) -> Option<Recipe> {
        self.recipes.remove(reference)
    }

    pub fn get(&self, reference: &Reference) -> Option<&Recipe> {
        self.recipes.get(reference)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeProvider for MemoryCatalog {
    fn available_versions(&self, name: &str) -> CraneResult<Vec<Reference>> {
        Ok(self
            .recipes
            .keys()
            .filter(|r| r.name() == name)
            .cloned()
            .collect())
    }

    fn recipe(&self, reference: &Reference) -> CraneResult<Recipe> {
        self.recipes
            .get(reference)
            .cloned()
            .ok_or_else(|| CraneError::RecipeNotFound {
                reference: reference.to_string(),
            })
    }
}

impl PackageIndex for MemoryCatalog {
    fn contains_package(&self, reference: &Reference) -> bool {
        self.recipes.contains_key(reference)
    }
}
