//! Shopping Cart
//!
//! The mutable per-conversation aggregate of selected items. Lines are kept
//! in insertion order and are unique per product id; quantities are always
//! positive, with zero behaving as removal.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};

/// One cart line: a product reference plus quantity and an optional note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: u32,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartLine {
    pub fn subtotal(&self) -> u64 {
        u64::from(self.quantity) * u64::from(self.unit_price)
    }
}

/// A pure, point-in-time copy of the cart. Independent of later mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: u64,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Insertion-ordered mapping of product id to cart line.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of a product, merging into an existing line by
    /// summing quantities. `quantity` must be positive; the intent parser
    /// already clamps zero. A provided note overwrites the stored one;
    /// `None` leaves it untouched.
    pub fn add(&mut self, product: &Product, quantity: u32, note: Option<String>) {
        debug_assert!(quantity > 0, "cart lines hold positive quantities");
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += quantity;
            if note.is_some() {
                line.note = note;
            }
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
                note,
            });
        }
    }

    /// Removes the line for a product id. Returns whether a line existed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() < before
    }

    /// Sets the quantity for an existing line; zero removes the line.
    /// Returns `false` when no line exists for the id.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Pure read: copied lines plus the derived total.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            total: self.lines.iter().map(CartLine::subtotal).sum(),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn bread() -> Product {
        Product::new("bread", "Whole Wheat Bread", "bakery", 40)
    }

    fn milk() -> Product {
        Product::new("milk", "Toned Milk", "dairy", 30)
    }

    #[test]
    fn snapshot_total_is_sum_of_subtotals() {
        let mut cart = Cart::new();
        cart.add(&bread(), 2, None);
        cart.add(&milk(), 3, None);
        let snap = cart.snapshot();
        assert_eq!(snap.total, 2 * 40 + 3 * 30);
        assert_eq!(
            snap.total,
            snap.lines.iter().map(CartLine::subtotal).sum::<u64>()
        );
    }

    #[test]
    fn add_merges_by_summing_quantity() {
        let mut split = Cart::new();
        split.add(&bread(), 2, None);
        split.add(&bread(), 3, None);

        let mut once = Cart::new();
        once.add(&bread(), 5, None);

        assert_eq!(split.snapshot().lines, once.snapshot().lines);
        assert_eq!(split.line_count(), 1);
    }

    #[test]
    fn add_overwrites_note_only_when_provided() {
        let mut cart = Cart::new();
        cart.add(&bread(), 1, Some("sliced".into()));
        cart.add(&bread(), 1, None);
        assert_eq!(cart.snapshot().lines[0].note.as_deref(), Some("sliced"));
        cart.add(&bread(), 1, Some("unsliced".into()));
        assert_eq!(cart.snapshot().lines[0].note.as_deref(), Some("unsliced"));
    }

    #[test]
    #[should_panic(expected = "positive quantities")]
    fn add_rejects_zero_quantity() {
        Cart::new().add(&bread(), 0, None);
    }

    #[test]
    fn update_to_zero_behaves_as_remove() {
        let mut a = Cart::new();
        a.add(&bread(), 2, None);
        a.update_quantity("bread", 0);

        let mut b = Cart::new();
        b.add(&bread(), 2, None);
        b.remove("bread");

        assert!(a.is_empty());
        assert_eq!(a.snapshot().lines, b.snapshot().lines);
    }

    #[test]
    fn remove_reports_missing_line() {
        let mut cart = Cart::new();
        assert!(!cart.remove("bread"));
        cart.add(&bread(), 1, None);
        assert!(cart.remove("bread"));
    }

    #[test]
    fn update_missing_line_is_false() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity("bread", 4));
    }

    #[test]
    fn preserves_insertion_order() {
        let catalog = Catalog::default_stock();
        let mut cart = Cart::new();
        cart.add(catalog.get("tea").unwrap(), 1, None);
        cart.add(catalog.get("bread").unwrap(), 1, None);
        cart.add(catalog.get("milk").unwrap(), 1, None);
        let ids: Vec<String> = cart
            .snapshot()
            .lines
            .into_iter()
            .map(|l| l.product_id)
            .collect();
        assert_eq!(ids, vec!["tea", "bread", "milk"]);
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut cart = Cart::new();
        cart.add(&bread(), 2, None);
        let snap = cart.snapshot();
        cart.clear();
        assert_eq!(snap.total, 80);
        assert_eq!(snap.lines.len(), 1);
        assert!(cart.is_empty());
    }
}
