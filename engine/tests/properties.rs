//! Property tests for the store invariants.

use proptest::prelude::*;
use serde_json::json;
use stash_engine::domain::{Post, PostPatch};
use stash_engine::{Cart, CartItem, EntityCollection, Position, Reconciliation, MIN_QUANTITY};
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum CartAction {
    Add(u8),
    Increment(u8),
    Decrement(u8),
}

fn cart_action() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (0u8..4).prop_map(CartAction::Add),
        (0u8..4).prop_map(CartAction::Increment),
        (0u8..4).prop_map(CartAction::Decrement),
    ]
}

#[derive(Debug, Clone)]
enum CollectionAction {
    Insert(u8, bool),
    Remove(u8),
    Patch(u8),
    Replace(Vec<u8>),
}

fn collection_action() -> impl Strategy<Value = CollectionAction> {
    prop_oneof![
        (0u8..8, any::<bool>()).prop_map(|(id, front)| CollectionAction::Insert(id, front)),
        (0u8..8).prop_map(CollectionAction::Remove),
        (0u8..8).prop_map(CollectionAction::Patch),
        prop::collection::vec(0u8..8, 0..10).prop_map(CollectionAction::Replace),
    ]
}

fn post(id: u8) -> Post {
    serde_json::from_value(json!({"_id": format!("p{}", id), "caption": "c"})).unwrap()
}

proptest! {
    #[test]
    fn cart_quantity_never_below_floor(actions in prop::collection::vec(cart_action(), 0..64)) {
        let mut cart = Cart::new();
        let mut expected = [0u32; 4];

        for action in actions {
            match action {
                CartAction::Add(id) => {
                    cart.add(CartItem::new(format!("i{}", id), "item", 10));
                    expected[id as usize] += 1;
                }
                CartAction::Increment(id) => {
                    cart.increment(&format!("i{}", id));
                    if expected[id as usize] > 0 {
                        expected[id as usize] += 1;
                    }
                }
                CartAction::Decrement(id) => {
                    cart.decrement(&format!("i{}", id));
                    if expected[id as usize] > MIN_QUANTITY {
                        expected[id as usize] -= 1;
                    }
                }
            }

            for item in cart.items() {
                prop_assert!(item.quantity >= MIN_QUANTITY);
            }
        }

        // Each id moves independently of the others
        for (id, quantity) in expected.iter().enumerate() {
            prop_assert_eq!(cart.quantity(&format!("i{}", id)), *quantity);
        }
    }

    #[test]
    fn collection_ids_stay_unique(actions in prop::collection::vec(collection_action(), 0..64)) {
        let mut collection = EntityCollection::<Post>::new();

        for action in actions {
            let reconciliation = match action {
                CollectionAction::Insert(id, front) => Reconciliation::Insert {
                    entity: post(id),
                    position: if front { Position::Prepend } else { Position::Append },
                },
                CollectionAction::Remove(id) => Reconciliation::Remove(format!("p{}", id)),
                CollectionAction::Patch(id) => Reconciliation::Update {
                    id: format!("p{}", id),
                    confirmed: None,
                    patch: PostPatch { caption: Some("patched".into()), ..Default::default() },
                },
                CollectionAction::Replace(ids) => {
                    Reconciliation::Replace(ids.into_iter().map(post).collect())
                }
            };
            reconciliation.apply(&mut collection);

            let mut seen = HashSet::new();
            for entity in collection.iter() {
                prop_assert!(seen.insert(entity.id.clone()));
            }
        }
    }

    #[test]
    fn last_replace_wins(first in prop::collection::vec(0u8..16, 0..12), second in prop::collection::vec(0u8..16, 0..12)) {
        let mut collection = EntityCollection::<Post>::new();
        Reconciliation::Replace(first.into_iter().map(post).collect()).apply(&mut collection);
        Reconciliation::Replace(second.iter().copied().map(post).collect()).apply(&mut collection);

        let mut expected = Vec::new();
        for id in second {
            let id = format!("p{}", id);
            if !expected.contains(&id) {
                expected.push(id);
            }
        }
        let actual: Vec<String> = collection.iter().map(|p| p.id.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn remove_changes_length_by_at_most_one(ids in prop::collection::vec(0u8..8, 0..10), target in 0u8..8) {
        let mut collection = EntityCollection::from_entities(ids.into_iter().map(post).collect());
        let before = collection.len();
        let present = collection.contains(&format!("p{}", target));

        Reconciliation::Remove(format!("p{}", target)).apply(&mut collection);
        prop_assert_eq!(collection.len(), if present { before - 1 } else { before });

        let after_first = collection.len();
        Reconciliation::Remove(format!("p{}", target)).apply(&mut collection);
        prop_assert_eq!(collection.len(), after_first);
    }
}
