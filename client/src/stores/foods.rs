//! Food menu store.

use std::sync::Arc;

use stash_engine::domain::Food;

use crate::binding::EpochToken;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::Transport;

/// The menu. Read-only.
#[derive(Debug)]
pub struct FoodStore {
    foods: RemoteStore<Food>,
}

impl FoodStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new("/api/food/list", "data", "data");
        Self {
            foods: RemoteStore::new("foods", transport, routes, policy),
        }
    }

    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        self.foods.fetch_all(token).await
    }

    pub fn foods(&self) -> Vec<Food> {
        self.foods.entities()
    }

    /// Dishes in `category`, in menu order.
    pub fn in_category(&self, category: &str) -> Vec<Food> {
        self.foods
            .entities()
            .into_iter()
            .filter(|food| food.category.as_deref() == Some(category))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Food> {
        self.foods.get(&id.to_string())
    }

    pub fn store(&self) -> &RemoteStore<Food> {
        &self.foods
    }
}
