//! Recipe definitions and the recipe registry.
//!
//! A recipe is an unordered pair of item names. The registry stores each pair
//! once, under the ordering it was first created with, and answers existence
//! queries by comparing pairs symmetrically.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Separator between the two item names in a rendered recipe key.
pub const KEY_SEPARATOR: char = '+';

/// Key of a recipe: the pair of item names in creation order.
///
/// Rendered as `first+second`. Equality is ordered; pair symmetry is checked by
/// [`Recipe::equals_pair`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RecipeKey {
    pub first: String,
    pub second: String,
}

impl RecipeKey {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Parse a rendered `first+second` key, splitting at the first separator.
    pub fn parse(rendered: &str) -> Result<Self, RecipeError> {
        rendered
            .split_once(KEY_SEPARATOR)
            .map(|(first, second)| Self::new(first, second))
            .ok_or_else(|| RecipeError::MalformedKey(rendered.to_string()))
    }
}

impl std::fmt::Display for RecipeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.first, KEY_SEPARATOR, self.second)
    }
}

impl From<RecipeKey> for String {
    fn from(key: RecipeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for RecipeKey {
    type Error = RecipeError;

    fn try_from(rendered: String) -> Result<Self, Self::Error> {
        Self::parse(&rendered)
    }
}

/// Errors raised by recipe and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    #[error("recipe {0} is already resolved")]
    AlreadyResolved(RecipeKey),

    #[error("a recipe for the pair {0} already exists")]
    Duplicate(RecipeKey),

    #[error("malformed recipe key {0:?}")]
    MalformedKey(String),
}

/// A pair of items, optionally bound to the item it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub first: String,
    pub second: String,

    /// Name of the produced item. Serialized as `""` while unresolved.
    #[serde(
        serialize_with = "serialize_result",
        deserialize_with = "deserialize_result",
        default
    )]
    result: Option<String>,
}

impl Recipe {
    /// Create an unresolved recipe.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            result: None,
        }
    }

    pub fn key(&self) -> RecipeKey {
        RecipeKey::new(self.first.clone(), self.second.clone())
    }

    /// Name of the produced item, if resolved.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    /// Check whether this recipe combines `first` and `second` in either order.
    pub fn equals_pair(&self, first: &str, second: &str) -> bool {
        (self.first == first && self.second == second)
            || (self.first == second && self.second == first)
    }

    /// Bind the recipe to its result. A recipe resolves exactly once.
    pub fn resolve(&mut self, result: impl Into<String>) -> Result<(), RecipeError> {
        if self.is_resolved() {
            return Err(RecipeError::AlreadyResolved(self.key()));
        }
        self.result = Some(result.into());
        Ok(())
    }
}

fn serialize_result<S: Serializer>(result: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(result.as_deref().unwrap_or_default())
}

fn deserialize_result<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.filter(|result| !result.is_empty()))
}

/// Mapping from recipe key to recipe, at most one entry per unordered pair.
///
/// Serialized as a map from rendered key to recipe. On the way back in, each
/// entry is keyed by its own `first`/`second` fields; the rendered map key is
/// not parsed, since item names may themselves contain the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecipeRegistry {
    recipes: BTreeMap<RecipeKey, Recipe>,
}

impl<'de> Deserialize<'de> for RecipeRegistry {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let rendered = BTreeMap::<String, Recipe>::deserialize(d)?;
        let mut recipes = BTreeMap::new();
        for recipe in rendered.into_values() {
            let key = recipe.key();
            if recipes.insert(key.clone(), recipe).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "recipe {key} appears more than once"
                )));
            }
        }
        Ok(Self { recipes })
    }
}

impl RecipeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a recipe for the pair exists under either ordering.
    ///
    /// Scans every recipe and compares pairs symmetrically.
    pub fn exists(&self, first: &str, second: &str) -> bool {
        self.recipes
            .values()
            .any(|recipe| recipe.equals_pair(first, second))
    }

    /// Insert a new unresolved recipe for `first` and `second`.
    pub fn create(&mut self, first: &str, second: &str) -> Result<&Recipe, RecipeError> {
        let key = RecipeKey::new(first, second);
        if self.exists(first, second) {
            return Err(RecipeError::Duplicate(key));
        }
        Ok(self
            .recipes
            .entry(key)
            .or_insert_with(|| Recipe::new(first, second)))
    }

    /// Iterate over every recipe. Order carries no meaning.
    pub fn all(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Keys of every unresolved recipe, collected up front so callers can
    /// mutate the registry while working through them.
    pub fn unresolved_keys(&self) -> Vec<RecipeKey> {
        self.recipes
            .iter()
            .filter(|(_, recipe)| !recipe.is_resolved())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn get(&self, key: &RecipeKey) -> Option<&Recipe> {
        self.recipes.get(key)
    }

    pub fn get_mut(&mut self, key: &RecipeKey) -> Option<&mut Recipe> {
        self.recipes.get_mut(key)
    }

    /// Number of recipes bound to a result.
    pub fn resolved_count(&self) -> usize {
        self.recipes.values().filter(|r| r.is_resolved()).count()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
