//! # Stash Engine
//!
//! IO-free state engine for remote-backed local stores.
//!
//! A store holds a cached copy of server-owned records. Components read from
//! it; actions either mutate local state directly (a shopping cart) or go to
//! the backend and reconcile the local copy with the response. This crate
//! holds everything about that pattern that does not touch the network, so
//! it can be tested without mocks.
//!
//! ## Core Concepts
//!
//! ### Entities
//!
//! Records implement [`Entity`]: a stable id plus a partial-update type.
//! [`EntityCollection`] keeps them ordered and never holds two records with
//! the same id.
//!
//! ### Reconciliation
//!
//! A successful response is expressed as a [`Reconciliation`] (replace,
//! insert, update, remove, clear, or a live arrival) and applied to the
//! collection in one step.
//!
//! ### Status
//!
//! [`Status`] tracks `loading` (true while any action is in flight) and the
//! last recorded [`ErrorDescriptor`].
//!
//! ### Envelopes
//!
//! The [`envelope`] module decodes `{ success, <key>: data }` responses into
//! typed records and rejects malformed ones.
//!
//! ## Quick Start
//!
//! ```rust
//! use stash_engine::{envelope, Reconciliation, StoreState};
//! use stash_engine::domain::Post;
//! use serde_json::json;
//!
//! let mut state = StoreState::<Post>::default();
//!
//! let body = json!({
//!     "success": true,
//!     "posts": [{"_id": "p2", "caption": "b"}, {"_id": "p1", "caption": "a"}]
//! });
//! let posts: Vec<Post> = envelope::decode_payload(&body, "posts").unwrap();
//!
//! state.status.begin();
//! state.commit(Reconciliation::Replace(posts));
//!
//! assert_eq!(state.entities()[0].id, "p2");
//! assert!(!state.status.loading);
//! ```

pub mod cart;
pub mod collection;
pub mod domain;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod reconcile;
pub mod state;
pub mod status;
pub mod validate;

// Re-export main types at crate root
pub use cart::{Cart, CartItem, CartItemPatch, MIN_QUANTITY};
pub use collection::{EntityCollection, Inserted};
pub use entity::{Entity, Position};
pub use error::{Error, Result};
pub use reconcile::{ReconcileReport, Reconciliation};
pub use state::StoreState;
pub use status::{ErrorDescriptor, ErrorKind, Status};
pub use validate::Validate;
