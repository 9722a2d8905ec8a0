//! The crafting dataset - the aggregate of everything discovered so far.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::items::{Item, ItemRegistry};
use crate::recipes::{Recipe, RecipeError, RecipeKey, RecipeRegistry};

/// Errors raised when the dataset would become inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("item {0:?} is not registered")]
    UnknownItem(String),

    #[error("recipe {0} is not registered")]
    UnknownRecipe(RecipeKey),

    #[error("recipe {key} produces {result:?}, which is not registered")]
    DanglingResult { key: RecipeKey, result: String },

    #[error("item stored under {key:?} is named {name:?}")]
    MisnamedItem { key: String, name: String },

    #[error("the pair {0} has more than one recipe")]
    DuplicatePair(RecipeKey),

    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

/// What happened when a recipe was bound to its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result item did not exist before.
    NewItem,
    /// The result item was already known; the recipe was credited to it.
    KnownItem,
}

/// The complete discovered state: items plus recipes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingDataset {
    pub items: ItemRegistry,
    pub recipes: RecipeRegistry,
}

impl CraftingDataset {
    /// Create a new empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset seeded with base items given as `(name, glyph)` pairs.
    pub fn with_base_items<'a>(seeds: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut dataset = Self::new();
        for (name, glyph) in seeds {
            dataset.items.insert_base(name, glyph);
        }
        dataset
    }

    /// Assemble a dataset from registries read back from storage.
    ///
    /// Producing-recipe keys on items are stored rendered, so they are matched
    /// back to the recipe they render from before the whole is validated.
    pub fn from_parts(items: ItemRegistry, recipes: RecipeRegistry) -> Result<Self, DatasetError> {
        let mut dataset = Self { items, recipes };
        dataset.relink_item_recipes()?;
        dataset.validate()?;
        Ok(dataset)
    }

    fn relink_item_recipes(&mut self) -> Result<(), DatasetError> {
        let by_rendered: HashMap<String, RecipeKey> = self
            .recipes
            .all()
            .map(|recipe| (recipe.key().to_string(), recipe.key()))
            .collect();

        for item in self.items.iter_mut() {
            for key in item.recipes.iter_mut() {
                match by_rendered.get(&key.to_string()) {
                    Some(linked) => *key = linked.clone(),
                    None => return Err(DatasetError::UnknownRecipe(key.clone())),
                }
            }
        }
        Ok(())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Create an unresolved recipe for two registered items.
    pub fn create_recipe(&mut self, first: &str, second: &str) -> Result<&Recipe, DatasetError> {
        for name in [first, second] {
            if !self.items.contains(name) {
                return Err(DatasetError::UnknownItem(name.to_string()));
            }
        }
        Ok(self.recipes.create(first, second)?)
    }

    /// Resolve the recipe under `key` to `result`, registering the result item
    /// and crediting the recipe as one of its producers.
    pub fn record_resolution(
        &mut self,
        key: &RecipeKey,
        result: &str,
        glyph: &str,
    ) -> Result<Resolution, DatasetError> {
        let recipe = self
            .recipes
            .get_mut(key)
            .ok_or_else(|| DatasetError::UnknownRecipe(key.clone()))?;
        recipe.resolve(result)?;

        let outcome = if self.items.contains(result) {
            Resolution::KnownItem
        } else {
            Resolution::NewItem
        };
        self.items.upsert(result, glyph, key.clone());
        Ok(outcome)
    }

    /// Look up the result item of a resolved recipe.
    pub fn result_item(&self, key: &RecipeKey) -> Option<&Item> {
        self.recipes
            .get(key)
            .and_then(Recipe::result)
            .and_then(|name| self.items.lookup(name))
    }

    /// Check that items are stored under their own names, that every recipe
    /// refers to registered items, that each unordered pair has one recipe,
    /// and that every producing key on an item names a registered recipe.
    pub fn validate(&self) -> Result<(), DatasetError> {
        for (key, item) in self.items.entries() {
            if key != item.name {
                return Err(DatasetError::MisnamedItem {
                    key: key.to_string(),
                    name: item.name.clone(),
                });
            }
            if let Some(missing) = item.recipes.iter().find(|k| self.recipes.get(k).is_none()) {
                return Err(DatasetError::UnknownRecipe(missing.clone()));
            }
        }

        for recipe in self.recipes.all() {
            let pairings = self
                .recipes
                .all()
                .filter(|other| other.equals_pair(&recipe.first, &recipe.second))
                .count();
            if pairings > 1 {
                return Err(DatasetError::DuplicatePair(recipe.key()));
            }
            for name in [&recipe.first, &recipe.second] {
                if !self.items.contains(name) {
                    return Err(DatasetError::UnknownItem(name.clone()));
                }
            }
            if let Some(result) = recipe.result() {
                if !self.items.contains(result) {
                    return Err(DatasetError::DanglingResult {
                        key: recipe.key(),
                        result: result.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
