//! Menu items of the food ordering app.

use crate::Entity;
use serde::{Deserialize, Serialize};

/// A dish on the menu. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Food {
    /// Cart line for one unit of this dish.
    pub fn to_cart_item(&self) -> crate::CartItem {
        crate::CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity: 1,
            image: self.image.clone(),
        }
    }
}

impl Entity for Food {
    type Id = String;
    type Patch = ();

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, _patch: &()) {}
}
