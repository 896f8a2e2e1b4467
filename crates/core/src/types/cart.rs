//! Cart line items and the ordered cart value.
//!
//! A [`Cart`] is an immutable-by-convention ordered list: every edit returns a
//! new cart and leaves the original untouched. Persistence and notification
//! are layered on top by the storefront's cart manager.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::id::ItemId;
use crate::types::price::Price;

/// A descriptive option on a line item (color, size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    /// Display name, e.g. "Navy" or "XL".
    pub name: String,
    /// Any other fields the cart-builder attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemOption {
    /// Create an option with just a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A single entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ItemOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ItemOption>,
    /// Fields this crate does not interpret, kept so that untouched items
    /// round-trip through the durable store unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartLineItem {
    /// Create a line item without color, size or extra fields.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: impl Into<Price>,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
            quantity,
            image: None,
            color: None,
            size: None,
            extra: Map::new(),
        }
    }

    /// Floored unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.price.units().saturating_mul(i64::from(self.quantity))
    }

    /// Copy of this item with `delta` applied to its quantity.
    ///
    /// Quantities that would drop to zero or below clamp to 1.
    #[must_use]
    pub fn with_quantity_delta(&self, delta: i64) -> Self {
        let next = i64::from(self.quantity).saturating_add(delta);
        let quantity = if next > 0 {
            u32::try_from(next).unwrap_or(u32::MAX)
        } else {
            1
        };
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// An ordered cart, unique by item id, in insertion order.
///
/// Serializes as a bare JSON array of line items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Wrap a snapshot as-is. Order is preserved; nothing is sorted or merged.
    #[must_use]
    pub const fn new(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Sum of every line total. An empty cart is 0.
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// Total number of units across all lines (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// New cart without any item whose id matches. Unknown ids are a no-op.
    #[must_use]
    pub fn without(&self, id: &ItemId) -> Self {
        self.items
            .iter()
            .filter(|item| &item.id != id)
            .cloned()
            .collect()
    }

    /// New cart with `delta` applied to the matching item's quantity.
    ///
    /// The quantity never drops below 1. Other items pass through unchanged;
    /// unknown ids are a no-op.
    #[must_use]
    pub fn with_quantity_delta(&self, id: &ItemId, delta: i64) -> Self {
        self.items
            .iter()
            .map(|item| {
                if &item.id == id {
                    item.with_quantity_delta(delta)
                } else {
                    item.clone()
                }
            })
            .collect()
    }

    /// New cart with `item` added.
    ///
    /// An existing line with the same id grows by the incoming quantity and
    /// keeps its position; otherwise the item is appended. A zero incoming
    /// quantity counts as 1.
    #[must_use]
    pub fn with_item(&self, item: CartLineItem) -> Self {
        let incoming = item.quantity.max(1);
        let mut items = self.items.clone();
        if let Some(existing) = items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(incoming);
        } else {
            items.push(CartLineItem {
                quantity: incoming,
                ..item
            });
        }
        Self { items }
    }
}

impl FromIterator<CartLineItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLineItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn scenario_cart() -> Cart {
        Cart::new(vec![
            CartLineItem::new("1", "Linen Shirt", "500.99", 2),
            CartLineItem::new("2", "Canvas Tote", 300_i64, 1),
        ])
    }

    #[test]
    fn test_line_total_floors_price() {
        let item = CartLineItem::new("1", "Linen Shirt", "500.99", 2);
        assert_eq!(item.line_total(), 1000);
    }

    #[test]
    fn test_subtotal_scenario() {
        assert_eq!(scenario_cart().subtotal(), 1300);
    }

    #[test]
    fn test_subtotal_empty_cart() {
        assert_eq!(Cart::default().subtotal(), 0);
    }

    #[test]
    fn test_subtotal_matches_sum_of_floors() {
        let cart = Cart::new(vec![
            CartLineItem::new("a", "A", 19.99, 3),
            CartLineItem::new("b", "B", "7", 4),
            CartLineItem::new("c", "C", "not a price", 9),
        ]);
        assert_eq!(cart.subtotal(), 19 * 3 + 7 * 4);
    }

    #[test]
    fn test_without_removes_matching_item() {
        let cart = scenario_cart().without(&ItemId::from("2"));
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ItemId::from("2")).is_none());
        assert_eq!(cart.items()[0].id, ItemId::from("1"));
    }

    #[test]
    fn test_without_unknown_id_is_noop() {
        let cart = scenario_cart();
        assert_eq!(cart.without(&ItemId::from("99")), cart);
    }

    #[test]
    fn test_quantity_clamps_at_one() {
        let cart = scenario_cart().with_quantity_delta(&ItemId::from("1"), -5);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_repeated_decrement_never_below_one() {
        let mut cart = scenario_cart();
        for _ in 0..10 {
            cart = cart.with_quantity_delta(&ItemId::from("1"), -1);
            assert!(cart.items()[0].quantity >= 1);
        }
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_increment_touches_only_matching_item() {
        let before = scenario_cart();
        let after = before.with_quantity_delta(&ItemId::from("1"), 1);
        assert_eq!(after.items()[0].quantity, 3);
        assert_eq!(after.items()[1], before.items()[1]);
        assert_eq!(
            serde_json::to_string(&after.items()[1]).unwrap(),
            serde_json::to_string(&before.items()[1]).unwrap()
        );
    }

    #[test]
    fn test_increment_leaves_other_stored_items_byte_identical() {
        let stored = r#"[{"id":1,"name":"Shirt","price":"500.99","quantity":2},{"id":2,"name":"Tote","price":300,"quantity":1}]"#;
        let before: Cart = serde_json::from_str(stored).unwrap();
        let after = before.with_quantity_delta(&ItemId::from("1"), 1);

        let written = serde_json::to_string(&after).unwrap();
        assert_eq!(
            written,
            r#"[{"id":1,"name":"Shirt","price":"500.99","quantity":3},{"id":2,"name":"Tote","price":300,"quantity":1}]"#
        );
    }

    #[test]
    fn test_quantity_delta_unknown_id_is_noop() {
        let cart = scenario_cart();
        assert_eq!(cart.with_quantity_delta(&ItemId::from("99"), 1), cart);
    }

    #[test]
    fn test_with_item_merges_by_id() {
        let cart = scenario_cart().with_item(CartLineItem::new("1", "Linen Shirt", "500.99", 3));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_with_item_appends_new_item() {
        let cart = scenario_cart().with_item(CartLineItem::new("3", "Wool Socks", 90_i64, 0));
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.items()[2].id, ItemId::from("3"));
        assert_eq!(cart.items()[2].quantity, 1);
    }

    #[test]
    fn test_item_count() {
        assert_eq!(scenario_cart().item_count(), 3);
    }

    #[test]
    fn test_absent_options_are_not_serialized() {
        let json = serde_json::to_value(CartLineItem::new("1", "Plain", 10_i64, 1)).unwrap();
        assert!(json.get("color").is_none());
        assert!(json.get("size").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = r#"[{"id":7,"name":"Cap","price":"25.50","quantity":1,"image":"/img/cap.jpg","size":{"name":"M"},"sku":"CAP-M"}]"#;
        let cart: Cart = serde_json::from_str(raw).unwrap();
        let item = &cart.items()[0];
        assert_eq!(item.size.as_ref().map(|s| s.name.as_str()), Some("M"));
        assert!(item.color.is_none());
        assert_eq!(item.extra.get("sku"), Some(&Value::from("CAP-M")));

        let written = serde_json::to_value(&cart).unwrap();
        assert_eq!(written[0]["sku"], "CAP-M");
        assert_eq!(written[0]["price"], "25.50");
        assert_eq!(written[0]["id"], 7);
        assert_eq!(written[0]["image"], "/img/cap.jpg");
    }
}
