//! Cart store: local state only.

use stash_engine::domain::OrderLine;
use stash_engine::{Cart, CartItem};
use tokio::sync::watch;

/// The shopping cart. Never touches the network.
#[derive(Debug)]
pub struct CartStore {
    cart: watch::Sender<Cart>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            cart: watch::Sender::new(Cart::new()),
        }
    }

    /// Add an item; an id already in the cart has its quantity increased.
    pub fn add(&self, item: CartItem) {
        let id = item.id.clone();
        self.cart.send_modify(|cart| cart.add(item));
        tracing::debug!(store = "cart", item = %id, "Added to cart");
    }

    pub fn increment(&self, id: &str) -> bool {
        self.cart.send_if_modified(|cart| cart.increment(id))
    }

    /// Decrease the quantity of `id`; stops at one.
    pub fn decrement(&self, id: &str) -> bool {
        self.cart.send_if_modified(|cart| cart.decrement(id))
    }

    pub fn remove(&self, id: &str) -> Option<CartItem> {
        let mut removed = None;
        self.cart.send_if_modified(|cart| {
            removed = cart.remove(id);
            removed.is_some()
        });
        removed
    }

    /// Take ordered lines out of the cart, keeping anything added since.
    pub fn check_out(&self, lines: &[OrderLine]) -> bool {
        self.cart.send_if_modified(|cart| cart.check_out(lines))
    }

    pub fn clear(&self) {
        self.cart.send_if_modified(|cart| {
            let had_items = !cart.is_empty();
            cart.clear();
            had_items
        });
    }

    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    pub fn subtotal(&self) -> u64 {
        self.cart.borrow().subtotal()
    }

    pub fn quantity(&self, id: &str) -> u32 {
        self.cart.borrow().quantity(id)
    }

    pub fn len(&self) -> usize {
        self.cart.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.borrow().is_empty()
    }
}
