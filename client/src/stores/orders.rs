//! Order store.

use std::sync::Arc;

use serde_json::json;
use stash_engine::domain::{Address, Order, OrderPatch, OrderStatus, PlaceOrder};
use stash_engine::Position;

use super::CartStore;
use crate::binding::EpochToken;
use crate::error::Result;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

const USER_ORDERS_PATH: &str = "/api/order/userorders";
const PLACE_ORDER_PATH: &str = "/api/order/place";
const ORDER_STATUS_PATH: &str = "/api/order/status";

/// The signed-in user's orders, newest first after placement.
#[derive(Debug)]
pub struct OrderStore {
    orders: RemoteStore<Order>,
}

impl OrderStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new(USER_ORDERS_PATH, "data", "order").prepend();
        Self {
            orders: RemoteStore::new("orders", transport, routes, policy),
        }
    }

    /// The backend lists orders on POST; the user comes from the cookie.
    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        let request = match ApiRequest::post(USER_ORDERS_PATH).json(&json!({})) {
            Ok(request) => request,
            Err(e) => return self.orders.reject(e).unwrap_or(Outcome::Failed),
        };
        self.orders.fetch_with(request, "data", token).await
    }

    /// Check out the cart. On success the order is prepended and the
    /// ordered lines leave the cart (anything added while the order was in
    /// flight stays); on failure the cart is left as it was.
    pub async fn place_order(&self, cart: &CartStore, address: Address, token: &EpochToken) -> Result<Outcome> {
        let snapshot = cart.snapshot();
        let input = PlaceOrder {
            items: snapshot.line_items(),
            amount: snapshot.subtotal(),
            address,
        };

        let outcome = self
            .orders
            .create_with(
                ApiRequest::post(PLACE_ORDER_PATH),
                &input,
                "order",
                Position::Prepend,
                token,
            )
            .await?;

        if outcome.is_committed() {
            cart.check_out(&input.items);
            tracing::info!(store = "orders", amount = input.amount, "Order placed");
        }
        Ok(outcome)
    }

    /// Change the delivery status of an order. The backend only confirms, so
    /// the status is applied locally.
    pub async fn update_status(&self, id: &str, status: OrderStatus, token: &EpochToken) -> Result<Outcome> {
        let body = json!({"orderId": id, "status": status});
        let patch = OrderPatch {
            status: Some(status),
            payment: None,
        };
        self.orders
            .update_with(
                ApiRequest::post(ORDER_STATUS_PATH),
                &body,
                id.to_string(),
                patch,
                "order",
                token,
            )
            .await
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.entities()
    }

    pub fn get(&self, id: &str) -> Option<Order> {
        self.orders.get(&id.to_string())
    }

    pub fn store(&self) -> &RemoteStore<Order> {
        &self.orders
    }
}
