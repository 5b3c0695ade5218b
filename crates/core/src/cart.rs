//! Cart lines and the reducers that mutate them.
//!
//! The cart is an ordered list of lines with at most one line per item ID.
//! Reducers here are pure; persisting the result is the caller's job.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, MenuItem, Price};

/// One catalog item plus its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartLine {
    /// Item ID of this line.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.item.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.price * self.quantity
    }
}

/// The visitor's cart.
///
/// Serializes as a plain JSON array of [`CartLine`] records, in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line for `item.id`, or appends a new line with
    /// quantity 1. Returns the line's new quantity.
    pub fn add(&mut self, item: &MenuItem) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine {
            item: item.clone(),
            quantity: 1,
        });
        1
    }

    /// Remove the line for `id`. Returns `false` if there was no such line.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.item.id != id);
        self.lines.len() != before
    }

    /// Set the quantity of the line for `id` to exactly `quantity`.
    ///
    /// A quantity below 1 removes the line. Setting the quantity of an item
    /// that is not in the cart does nothing. Returns `true` if the cart
    /// changed.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove(id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| &l.item.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines (badge count).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.item.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: &str, price: u32) -> MenuItem {
        MenuItem {
            id: ItemId::new(id),
            name: format!("Dish {id}"),
            price: Price::from_units(price),
            description: "Tasty".to_owned(),
            category: "Mains".to_owned(),
            image_url: format!("https://img.example/{id}.jpg"),
        }
    }

    #[test]
    fn test_repeated_add_keeps_single_line() {
        let mut cart = Cart::new();
        let paneer = item("a", 100);
        for expected in 1..=5 {
            assert_eq!(cart.add(&paneer), expected);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ItemId::new("a")).unwrap().quantity, 5);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&item("b", 10));
        cart.add(&item("a", 20));
        cart.add(&item("b", 10));
        let ids: Vec<_> = cart.lines().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut a = Cart::new();
        a.add(&item("a", 100));
        a.add(&item("b", 50));
        let mut b = a.clone();

        assert!(a.set_quantity(&ItemId::new("a"), 0));
        assert!(b.remove(&ItemId::new("a")));
        assert_eq!(a, b);

        assert!(a.set_quantity(&ItemId::new("b"), -3));
        assert!(a.is_empty());
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        cart.add(&item("a", 100));
        assert!(cart.set_quantity(&ItemId::new("a"), 7));
        assert_eq!(cart.total_items(), 7);
        assert!(!cart.set_quantity(&ItemId::new("a"), 7));
    }

    #[test]
    fn test_set_quantity_absent_item_is_noop() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        let before = cart.clone();
        assert!(!cart.set_quantity(&ItemId::new("zzz"), 4));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_absent_is_idempotent() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        let before = cart.clone();
        assert!(!cart.remove(&ItemId::new("missing")));
        assert!(!cart.remove(&ItemId::new("missing")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_total_items_tracks_mutations() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        cart.add(&item("a", 100));
        cart.add(&item("b", 40));
        assert_eq!(cart.total_items(), 3);

        cart.set_quantity(&ItemId::new("b"), 10);
        assert_eq!(cart.total_items(), 12);

        cart.remove(&ItemId::new("a"));
        assert_eq!(cart.total_items(), 10);

        cart.clear();
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        cart.add(&item("a", 100));
        cart.add(&item("b", 35));
        assert_eq!(cart.subtotal(), Price::from_units(235));
        assert_eq!(Cart::new().subtotal(), Price::ZERO);
    }

    #[test]
    fn test_persisted_form_is_ordered_array() {
        let mut cart = Cart::new();
        cart.add(&item("a", 100));
        cart.add(&item("b", 40));
        cart.add(&item("a", 100));

        let json = serde_json::to_value(&cart).unwrap();
        let lines = json.as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], "a");
        assert_eq!(lines[0]["quantity"], 2);
        assert_eq!(lines[1]["name"], "Dish b");

        let reloaded: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(reloaded, cart);
    }
}
