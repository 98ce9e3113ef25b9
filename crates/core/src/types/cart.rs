//! Cart contents.
//!
//! A cart is an ordered list of product snapshots. Every "add" appends a
//! discrete entry, duplicates included; there is no quantity field. Each entry
//! carries a [`CartEntryId`] so it can be removed without relying on its
//! position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::CartEntryId;
use super::order::OrderLine;
use super::price::Price;
use super::product::Product;

/// One entry in the cart: a copy of a product taken when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Stable local identifier.
    pub entry_id: CartEntryId,
    /// When the entry was added.
    pub added_at: DateTime<Utc>,
    /// Snapshot of the product at add time.
    #[serde(flatten)]
    pub product: Product,
}

impl CartItem {
    /// Snapshot a product into a new entry.
    #[must_use]
    pub fn snapshot(product: Product) -> Self {
        Self {
            entry_id: CartEntryId::new(),
            added_at: Utc::now(),
            product,
        }
    }

    /// Price captured in the snapshot.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.product.price
    }
}

/// An ordered collection of cart entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the snapshot prices of all entries.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::price).sum()
    }

    /// Append an entry.
    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// Entry at a display position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CartItem> {
        self.items.get(index)
    }

    /// Remove the entry with the given ID.
    pub fn remove(&mut self, entry_id: CartEntryId) -> Option<CartItem> {
        let pos = self.items.iter().position(|i| i.entry_id == entry_id)?;
        Some(self.items.remove(pos))
    }

    /// Order lines for submission, one per distinct product.
    ///
    /// Duplicate entries are folded into a single line whose quantity is the
    /// number of entries for that product. Lines keep the order in which each
    /// product first appears in the cart.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        let mut lines: Vec<OrderLine> = Vec::new();
        for item in &self.items {
            match lines.iter_mut().find(|l| l.product == item.product.id) {
                Some(line) => line.quantity += 1,
                None => lines.push(OrderLine {
                    product: item.product.id.clone(),
                    quantity: 1,
                }),
            }
        }
        lines
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::ProductId;

    fn product(id: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_units(price),
            image: String::new(),
            category: "Sensors".to_string(),
            stock: 5,
            in_stock: true,
        }
    }

    #[test]
    fn test_total_is_sum_of_snapshots() {
        let mut cart = Cart::new();
        cart.push(CartItem::snapshot(product("a", 100)));
        cart.push(CartItem::snapshot(product("b", 250)));
        assert_eq!(cart.total(), Price::from_units(350));

        let first = cart.get(0).unwrap().entry_id;
        cart.remove(first);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Price::from_units(250));
    }

    #[test]
    fn test_duplicates_are_separate_entries() {
        let mut cart = Cart::new();
        cart.push(CartItem::snapshot(product("a", 100)));
        cart.push(CartItem::snapshot(product("a", 100)));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.order_lines()[0].quantity, 2);
        assert_eq!(cart.total(), Price::from_units(200));
    }

    #[test]
    fn test_remove_unknown_entry_is_noop() {
        let mut cart = Cart::new();
        cart.push(CartItem::snapshot(product("a", 100)));
        assert!(cart.remove(CartEntryId::new()).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_order_lines_fold_duplicates_in_first_seen_order() {
        let mut cart = Cart::new();
        cart.push(CartItem::snapshot(product("b", 10)));
        cart.push(CartItem::snapshot(product("a", 20)));
        cart.push(CartItem::snapshot(product("b", 10)));

        let lines = cart.order_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.as_str(), "b");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].product.as_str(), "a");
        assert_eq!(lines[1].quantity, 1);
    }

    #[test]
    fn test_stored_form_keeps_entry_id_and_product_fields() {
        let mut cart = Cart::new();
        cart.push(CartItem::snapshot(product("a", 100)));

        let json = serde_json::to_value(&cart).unwrap();
        let entry = &json[0];
        assert!(entry["entryId"].is_string());
        assert_eq!(entry["_id"], "a");
        assert_eq!(entry["price"], 100);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
