//! StoreState - the in-memory state of one store.

use crate::{Entity, EntityCollection, ReconcileReport, Reconciliation, Status};
use serde::Serialize;

/// Entities plus network status.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct StoreState<E: Entity> {
    pub entities: EntityCollection<E>,
    pub status: Status,
}

impl<E: Entity> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            entities: EntityCollection::new(),
            status: Status::default(),
        }
    }
}

impl<E: Entity> StoreState<E> {
    /// Apply a reconciliation and mark the action successful.
    pub fn commit(&mut self, reconciliation: Reconciliation<E>) -> ReconcileReport {
        let report = reconciliation.apply(&mut self.entities);
        self.status.succeed();
        report
    }

    /// Records in collection order.
    pub fn entities(&self) -> &[E] {
        self.entities.as_slice()
    }

    pub fn is_loading(&self) -> bool {
        self.status.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::Note;
    use crate::{ErrorDescriptor, ErrorKind};

    #[test]
    fn commit_settles_status() {
        let mut state = StoreState::<Note>::default();
        state.status.begin();
        state.status.fail(ErrorDescriptor::new(ErrorKind::Transport, "x"));
        state.status.begin();

        let report = state.commit(Reconciliation::Replace(vec![Note::new("a", "1")]));
        assert_eq!(report.added, 1);
        assert!(!state.is_loading());
        assert!(state.status.last_error.is_none());
        assert_eq!(state.entities().len(), 1);
    }

    #[test]
    fn serializes_entities_and_status() {
        let state = StoreState::<Note>::default();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entities": [],
                "status": {"loading": false, "lastError": null}
            })
        );
    }
}
