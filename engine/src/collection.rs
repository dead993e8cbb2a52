//! Ordered, id-unique entity collection.
//!
//! The collection keeps records in the order they were received and never
//! holds two records with the same id. Every write path goes through one of
//! the methods below, so the uniqueness invariant holds after each mutation.

use crate::{Entity, Position};
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Outcome of inserting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// The id was new; the record was placed at the requested position.
    Added,
    /// The id already existed; the record replaced it in place.
    Replaced,
}

/// An ordered collection of entities.
#[derive(Debug, Clone)]
pub struct EntityCollection<E: Entity> {
    entities: Vec<E>,
}

impl<E: Entity> Default for EntityCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityCollection<E> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Build a collection from a payload, collapsing repeated ids.
    pub fn from_entities(entities: Vec<E>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(entities);
        collection
    }

    /// Replace the whole collection, keeping the order received.
    ///
    /// A repeated id keeps the position of its first occurrence and the
    /// value of its last.
    pub fn replace_all(&mut self, entities: Vec<E>) {
        let mut seen = HashSet::with_capacity(entities.len());
        let mut next: Vec<E> = Vec::with_capacity(entities.len());

        for entity in entities {
            if seen.insert(entity.id().clone()) {
                next.push(entity);
            } else if let Some(slot) = next.iter_mut().find(|e| e.id() == entity.id()) {
                *slot = entity;
            }
        }

        self.entities = next;
    }

    /// Insert a record. An existing id is replaced in place.
    pub fn insert(&mut self, entity: E, position: Position) -> Inserted {
        if let Some(index) = self.position(entity.id()) {
            self.entities[index] = entity;
            return Inserted::Replaced;
        }

        match position {
            Position::Append => self.entities.push(entity),
            Position::Prepend => self.entities.insert(0, entity),
        }
        Inserted::Added
    }

    /// Replace the record with `id`, preserving its position.
    ///
    /// Returns false (and leaves the collection untouched) if `id` is absent.
    pub fn replace(&mut self, id: &E::Id, entity: E) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        // The replacement may carry a different id; drop any other record
        // already holding it.
        let new_id = entity.id().clone();
        if &new_id != id {
            if let Some(other) = self.position(&new_id) {
                self.entities.remove(other);
            }
        }

        let index = self.position(id).unwrap_or(index);
        self.entities[index] = entity;
        true
    }

    /// Apply a patch to the record with `id`.
    ///
    /// Returns false if `id` is absent.
    pub fn patch(&mut self, id: &E::Id, patch: &E::Patch) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`. No-op if absent.
    pub fn remove(&mut self, id: &E::Id) -> Option<E> {
        self.position(id).map(|index| self.entities.remove(index))
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Get a record by id.
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Get a mutable record by id.
    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Index of the record with `id`.
    pub fn position(&self, id: &E::Id) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &E::Id) -> bool {
        self.position(id).is_some()
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entities.iter()
    }

    /// Records as a slice, in collection order.
    pub fn as_slice(&self) -> &[E] {
        &self.entities
    }

    /// Clone the records into a vector.
    pub fn to_vec(&self) -> Vec<E> {
        self.entities.clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<E: Entity> Serialize for EntityCollection<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entities.serialize(serializer)
    }
}

impl<'a, E: Entity> IntoIterator for &'a EntityCollection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
