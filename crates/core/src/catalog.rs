//! Product Catalog
//!
//! This module holds the read-only product catalog and implements the
//! free-text resolution used by the intent handlers. Resolution is fully
//! deterministic for a fixed catalog: a strict tier precedence with
//! catalog-order tie-breaking.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single purchasable product. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique, stable identifier (e.g. "bread").
    pub id: String,
    /// Human-readable display name (e.g. "Whole Wheat Bread").
    pub name: String,
    /// Coarse grouping used for browsing replies.
    pub category: String,
    /// Unit price in whole currency units.
    pub price: u32,
    /// Optional display color, carried through for clients that render tiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Product {
    pub fn new(id: &str, name: &str, category: &str, price: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price,
            color: None,
        }
    }
}

/// The read-only catalog, kept in load order.
///
/// Load order matters: substring and token-overlap resolution break ties by
/// the first match in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The built-in stock used when no catalog file exists on disk.
    pub fn default_stock() -> Self {
        Self::new(vec![
            Product::new("bread", "Whole Wheat Bread", "bakery", 40),
            Product::new("butter", "Salted Butter", "dairy", 55),
            Product::new("milk", "Toned Milk", "dairy", 30),
            Product::new("eggs", "Farm Eggs (6)", "dairy", 48),
            Product::new("pasta", "Penne Pasta", "pantry", 85),
            Product::new("pasta_sauce", "Tomato Pasta Sauce", "pantry", 120),
            Product::new("rice", "Basmati Rice 1kg", "pantry", 140),
            Product::new("onion", "Red Onion 1kg", "produce", 35),
            Product::new("tomato", "Tomato 1kg", "produce", 42),
            Product::new("potato", "Potato 1kg", "produce", 28),
            Product::new("paneer", "Fresh Paneer 200g", "dairy", 90),
            Product::new("tea", "Assam Tea 250g", "beverages", 160),
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by its exact id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Resolves free text to a product, or `None` for a recoverable miss.
    ///
    /// Tier precedence, first hit wins:
    /// 1. exact id match,
    /// 2. exact full-name match,
    /// 3. first product (catalog order) whose name contains the query,
    /// 4. highest whitespace-token overlap between query and name, ties
    ///    broken by catalog order. Zero overlap is a miss.
    pub fn resolve(&self, free_text: &str) -> Option<&Product> {
        let query = free_text.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(p) = self.products.iter().find(|p| p.id.to_lowercase() == query) {
            return Some(p);
        }
        if let Some(p) = self
            .products
            .iter()
            .find(|p| p.name.to_lowercase() == query)
        {
            return Some(p);
        }
        if let Some(p) = self
            .products
            .iter()
            .find(|p| p.name.to_lowercase().contains(&query))
        {
            return Some(p);
        }

        let query_tokens: Vec<&str> = query.split_whitespace().collect();
        let mut best: Option<(&Product, usize)> = None;
        for product in &self.products {
            let name = product.name.to_lowercase();
            let name_tokens: Vec<&str> = name.split_whitespace().collect();
            let score = query_tokens
                .iter()
                .filter(|t| name_tokens.contains(t))
                .count();
            // Strictly-greater keeps the first max-scorer in catalog order.
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((product, score));
            }
        }

        match best {
            Some((product, score)) => {
                debug!(query = %query, product = %product.id, score, "resolved by token overlap");
                Some(product)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new("bread", "Whole Wheat Bread", "bakery", 40),
            Product::new("butter", "Salted Butter", "dairy", 55),
            Product::new("white_bread", "White Bread", "bakery", 35),
            Product::new("milk", "Toned Milk", "dairy", 30),
        ])
    }

    #[test]
    fn resolves_exact_id_first() {
        let c = catalog();
        assert_eq!(c.resolve("bread").unwrap().id, "bread");
        // Tier 1 beats tier 3: "bread" is also a substring of "White Bread".
        assert_eq!(c.resolve("BREAD").unwrap().id, "bread");
    }

    #[test]
    fn resolves_exact_name_before_substring() {
        let c = catalog();
        assert_eq!(c.resolve("white bread").unwrap().id, "white_bread");
        assert_eq!(c.resolve("Whole Wheat Bread").unwrap().id, "bread");
    }

    #[test]
    fn resolves_name_substring_in_catalog_order() {
        let c = catalog();
        // "wheat" only appears in "Whole Wheat Bread".
        assert_eq!(c.resolve("wheat").unwrap().id, "bread");
        // "butter" matches the id tier first, but "salted" is substring-only.
        assert_eq!(c.resolve("salted").unwrap().id, "butter");
    }

    #[test]
    fn token_overlap_picks_max_score_first_in_order() {
        let c = catalog();
        // "wheat loaf" shares one token with "Whole Wheat Bread" only.
        assert_eq!(c.resolve("wheat loaf").unwrap().id, "bread");
        // One shared token with both bread products: first in catalog order wins.
        assert_eq!(c.resolve("bread loaf").unwrap().id, "bread");
    }

    #[test]
    fn miss_returns_none() {
        let c = catalog();
        assert!(c.resolve("dragon fruit").is_none());
        assert!(c.resolve("   ").is_none());
        assert!(c.resolve("").is_none());
    }

    #[test]
    fn default_stock_contains_bread() {
        let c = Catalog::default_stock();
        let bread = c.get("bread").unwrap();
        assert_eq!(bread.name, "Whole Wheat Bread");
        assert_eq!(bread.price, 40);
    }

    #[test]
    fn product_serde_round_trip() {
        let p = Product::new("tea", "Assam Tea 250g", "beverages", 160);
        let json = serde_json::to_string(&p).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        // `color` is omitted when absent.
        assert!(!json.contains("color"));
    }
}
