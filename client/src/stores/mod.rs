//! Domain stores.
//!
//! Each store wraps a [`RemoteStore`](crate::store::RemoteStore) (or, for
//! the cart, plain local state) and adds the endpoints and scalar fields of
//! its domain.

mod cart;
mod chat;
mod courses;
mod foods;
mod jobs;
mod orders;
mod posts;
mod session;

pub use cart::CartStore;
pub use chat::ChatStore;
pub use courses::CourseStore;
pub use foods::FoodStore;
pub use jobs::JobStore;
pub use orders::OrderStore;
pub use posts::PostStore;
pub use session::SessionStore;
