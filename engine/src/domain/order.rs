//! Food orders.

use crate::validate::{require_non_empty, require_positive, require_text, Validate};
use crate::{error::Result, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Food Processing")]
    Processing,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    pub phone: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub items: Vec<OrderLine>,
    pub amount: u64,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Partial update of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<bool>,
}

impl Entity for Order {
    type Id = String;
    type Patch = OrderPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payment) = patch.payment {
            self.payment = payment;
        }
    }
}

/// Checkout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<OrderLine>,
    pub amount: u64,
    pub address: Address,
}

impl Validate for PlaceOrder {
    fn validate(&self) -> Result<()> {
        require_non_empty("items", &self.items)?;
        require_positive("amount", self.amount)?;
        require_text("address.street", &self.address.street)?;
        require_text("address.phone", &self.address.phone)
    }
}
