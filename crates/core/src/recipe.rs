//! Recipe Table
//!
//! Maps a dish name to an ordered list of catalog item references. The table
//! is read-only after load; lookups are case-insensitive with a substring
//! fallback so "pasta for two please" still finds "pasta for two".

use crate::catalog::{Catalog, Product};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A dish mapped to the catalog tokens (ids or names) that make it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub dish: String,
    pub items: Vec<String>,
}

impl Recipe {
    pub fn new(dish: &str, items: &[&str]) -> Self {
        Self {
            dish: dish.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ordered collection of recipes; order matters for substring fallback.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// The built-in recipes used when no recipe file exists on disk.
    pub fn default_recipes() -> Self {
        Self::new(vec![
            Recipe::new("pasta for two", &["pasta", "pasta_sauce", "butter"]),
            Recipe::new("masala chai", &["tea", "milk"]),
            Recipe::new("veggie curry", &["onion", "tomato", "potato", "rice"]),
            Recipe::new("paneer bhurji", &["paneer", "onion", "tomato", "butter"]),
        ])
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Resolves a dish name to its constituent products.
    ///
    /// Lookup is exact (case-insensitive) first, then the first recipe whose
    /// key contains the query as a substring. Ingredient tokens that do not
    /// resolve through the catalog are skipped; `None` means the dish itself
    /// is unmapped.
    pub fn resolve<'a>(&self, dish: &str, catalog: &'a Catalog) -> Option<Vec<&'a Product>> {
        let query = dish.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let recipe = self
            .recipes
            .iter()
            .find(|r| r.dish.to_lowercase() == query)
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|r| r.dish.to_lowercase().contains(&query))
            })?;

        let mut products = Vec::with_capacity(recipe.items.len());
        for token in &recipe.items {
            match catalog.resolve(token) {
                Some(product) => products.push(product),
                None => warn!(dish = %recipe.dish, token = %token, "skipping unresolved recipe item"),
            }
        }
        Some(products)
    }
}
