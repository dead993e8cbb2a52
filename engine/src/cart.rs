//! The shopping cart: a purely local store.
//!
//! The cart never talks to the backend. Its only network-facing use is
//! turning its lines into an order at checkout.

use crate::domain::OrderLine;
use crate::{Entity, EntityCollection, Position};
use serde::{Deserialize, Serialize};

/// Smallest quantity a cart line can hold. Decrementing stops here; use
/// [`Cart::remove`] to drop the line.
pub const MIN_QUANTITY: u32 = 1;

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_quantity() -> u32 {
    MIN_QUANTITY
}

impl CartItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity: MIN_QUANTITY,
            image: None,
        }
    }

    /// Price of the line.
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl Entity for CartItem {
    type Id = String;
    type Patch = CartItemPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &CartItemPatch) {
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity.max(MIN_QUANTITY);
        }
    }
}

/// The cart contents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    items: EntityCollection<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Adding an id that is already in the cart aggregates:
    /// the incoming quantity is added to the existing line.
    pub fn add(&mut self, item: CartItem) {
        let incoming = item.quantity.max(MIN_QUANTITY);

        if let Some(existing) = self.items.get_mut(&item.id) {
            existing.quantity = existing.quantity.saturating_add(incoming);
            return;
        }

        self.items.insert(
            CartItem {
                quantity: incoming,
                ..item
            },
            Position::Append,
        );
    }

    /// Increase the quantity of `id` by one. Returns false if `id` is absent.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.items.get_mut(&id.to_string()) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrease the quantity of `id` by one, never below [`MIN_QUANTITY`].
    ///
    /// Returns true if the quantity changed.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.items.get_mut(&id.to_string()) {
            Some(item) if item.quantity > MIN_QUANTITY => {
                item.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    /// Remove a line. No-op if absent.
    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        self.items.remove(&id.to_string())
    }

    /// Take ordered `lines` out of the cart.
    ///
    /// Each line's quantity is subtracted from the matching cart line; a
    /// line left with less than [`MIN_QUANTITY`] is removed. Units added
    /// after the order was built stay in the cart. Returns true if anything
    /// changed.
    pub fn check_out(&mut self, lines: &[OrderLine]) -> bool {
        let mut changed = false;
        for line in lines {
            let id = &line.id;
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };
            let remaining = item.quantity.saturating_sub(line.quantity);
            if remaining < MIN_QUANTITY {
                self.items.remove(id);
            } else {
                item.quantity = remaining;
            }
            changed = true;
        }
        changed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.get(&id.to_string())
    }

    /// Quantity of `id`, zero if absent.
    pub fn quantity(&self, id: &str) -> u32 {
        self.get(id).map(|item| item.quantity).unwrap_or(0)
    }

    pub fn items(&self) -> &[CartItem] {
        self.items.as_slice()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total()))
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Lines for an order request.
    pub fn line_items(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                id: item.id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
            })
            .collect()
    }
}
