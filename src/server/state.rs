//! Shared element-server state.
//!
//! DESIGN
//! ======
//! `ServerState` is injected into Axum handlers via the `State` extractor.
//! The recipe book is seeded at startup and grows as the generator answers
//! unknown pairs. Submitted scores are only counted.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::ServerError;
use super::generate::{CombinationGenerator, element_name};

// =============================================================================
// RECIPES
// =============================================================================

/// One known combination, in the same shape the lookup endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub element1: String,
    pub element2: String,
    pub result: String,
}

/// Known combinations. Lookups match the pair in either order.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    results: HashMap<(String, String), String>,
}

impl RecipeBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `first + second = result`. A later recipe for the same ordered
    /// pair replaces the earlier one.
    pub fn insert(&mut self, recipe: Recipe) {
        self.results.insert((recipe.element1, recipe.element2), recipe.result);
    }

    #[must_use]
    pub fn lookup(&self, first: &str, second: &str) -> Option<&str> {
        self.results
            .get(&(first.to_string(), second.to_string()))
            .or_else(|| self.results.get(&(second.to_string(), first.to_string())))
            .map(String::as_str)
    }

    /// A stored result whose name, emoji aside, is `name`.
    #[must_use]
    pub fn result_named(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.results
            .values()
            .filter(|result| element_name(result) == name)
            .min()
            .map(String::as_str)
    }

    /// Store a generated result for `first + second` and return what was
    /// stored. An existing result with the same name keeps its emoji; a
    /// pair learned meanwhile keeps its earlier answer.
    pub fn learn(&mut self, first: &str, second: &str, generated: &str) -> String {
        if let Some(known) = self.lookup(first, second) {
            return known.to_string();
        }
        let result = self.result_named(&element_name(generated)).unwrap_or(generated).to_string();
        self.insert(Recipe { element1: first.to_string(), element2: second.to_string(), result: result.clone() });
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Parse a JSON array of `{ element1, element2, result }` objects.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Recipes` if the document is not such an array.
    pub fn from_json(json: &str) -> Result<Self, ServerError> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).map_err(|e| ServerError::Recipes(e.to_string()))?;
        Ok(recipes.into_iter().collect())
    }

    /// Read and parse a recipe file.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Recipes` if the file is unreadable or malformed.
    pub async fn load(path: &Path) -> Result<Self, ServerError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServerError::Recipes(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

impl FromIterator<Recipe> for RecipeBook {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut book = Self::new();
        for recipe in iter {
            book.insert(recipe);
        }
        book
    }
}

// =============================================================================
// SERVER STATE
// =============================================================================

/// Clone is required by Axum; inner fields are Arc-wrapped.
#[derive(Clone, Default)]
pub struct ServerState {
    pub recipes: Arc<RwLock<RecipeBook>>,
    /// Answers pairs missing from `recipes`; `None` leaves them `null`.
    pub generator: Option<Arc<dyn CombinationGenerator>>,
    pub scores_received: Arc<AtomicU64>,
}

impl ServerState {
    #[must_use]
    pub fn new(recipes: RecipeBook) -> Self {
        Self { recipes: Arc::new(RwLock::new(recipes)), ..Self::default() }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn CombinationGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
