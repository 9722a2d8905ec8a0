//! Item definitions and the item registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::recipes::RecipeKey;

/// A discovered or seed item, identified by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,

    /// Display glyph, usually a single emoji.
    #[serde(rename = "emoji")]
    pub glyph: String,

    /// Keys of the recipes known to produce this item, in discovery order.
    /// Empty for base items.
    #[serde(default)]
    pub recipes: Vec<RecipeKey>,
}

impl Item {
    /// Create a base item with no producing recipes.
    pub fn base(name: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glyph: glyph.into(),
            recipes: Vec::new(),
        }
    }

    /// Check whether this item is a base item.
    pub fn is_base(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Check whether `key` is already credited as producing this item.
    pub fn is_produced_by(&self, key: &RecipeKey) -> bool {
        self.recipes.contains(key)
    }

    /// Credit `key` as a producing recipe. Returns false if it was already present.
    fn credit(&mut self, key: RecipeKey) -> bool {
        if self.is_produced_by(&key) {
            return false;
        }
        self.recipes.push(key);
        true
    }
}

/// Mapping from item name to item record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRegistry {
    items: BTreeMap<String, Item>,
}

impl ItemRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update an item produced by `key`.
    ///
    /// An existing item gets `key` appended to its recipe list unless it is
    /// already there; its glyph is left untouched. A missing item is created
    /// with `glyph` and `key` as its only recipe.
    pub fn upsert(&mut self, name: &str, glyph: &str, key: RecipeKey) -> &Item {
        let item = self
            .items
            .entry(name.to_string())
            .or_insert_with(|| Item::base(name, glyph));
        item.credit(key);
        item
    }

    /// Insert a base item. No-op if an item with this name already exists.
    pub fn insert_base(&mut self, name: &str, glyph: &str) -> &Item {
        self.items
            .entry(name.to_string())
            .or_insert_with(|| Item::base(name, glyph))
    }

    /// Look up an item by name.
    pub fn lookup(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Check if an item is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Iterate over all items.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Iterate over `(registry key, item)` pairs.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.items.iter().map(|(name, item)| (name.as_str(), item))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.values_mut()
    }

    /// Owned list of every item name.
    pub fn names(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
