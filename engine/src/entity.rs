//! Entity trait for records mirrored from the backend.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A domain record with a stable identifier, owned by the backend and
/// mirrored locally.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type. Unique within a collection.
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Partial update applied by `update_one`.
    type Patch: Clone + Debug + Serialize + Send + Sync + 'static;

    /// The record identifier.
    fn id(&self) -> &Self::Id;

    /// Apply a partial update in place.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Where a newly created record lands in a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Add to the end (chat messages, cart lines).
    #[default]
    Append,
    /// Add to the front (newest-first feeds).
    Prepend,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal entity used by engine unit tests.

    use super::Entity;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Note {
        #[serde(rename = "_id")]
        pub id: String,
        pub text: String,
        #[serde(default)]
        pub pinned: bool,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct NotePatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub pinned: Option<bool>,
    }

    impl Note {
        pub fn new(id: &str, text: &str) -> Self {
            Self {
                id: id.to_string(),
                text: text.to_string(),
                pinned: false,
            }
        }
    }

    impl Entity for Note {
        type Id = String;
        type Patch = NotePatch;

        fn id(&self) -> &String {
            &self.id
        }

        fn apply_patch(&mut self, patch: &NotePatch) {
            if let Some(text) = &patch.text {
                self.text = text.clone();
            }
            if let Some(pinned) = patch.pinned {
                self.pinned = pinned;
            }
        }
    }
}
