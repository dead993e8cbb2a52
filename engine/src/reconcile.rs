//! Reconciliation of server responses into a local collection.
//!
//! A [`Reconciliation`] describes what a successful response means for the
//! local copy; [`Reconciliation::apply`] performs it against an
//! [`EntityCollection`] and reports what changed. Applying is the only way
//! a response reaches the collection, so uniqueness and order invariants
//! are maintained in one place.

use crate::collection::Inserted;
use crate::{Entity, EntityCollection, Position};
use serde::Serialize;

/// A server response, expressed as a change to the local collection.
#[derive(Debug, Clone)]
pub enum Reconciliation<E: Entity> {
    /// Full fetch: replace every record, in the order received.
    Replace(Vec<E>),
    /// Confirmed creation.
    Insert { entity: E, position: Position },
    /// Confirmed update. When the server returns the record it replaces the
    /// local one; a status-only confirmation applies `patch` locally.
    Update {
        id: E::Id,
        confirmed: Option<E>,
        patch: E::Patch,
    },
    /// Confirmed removal.
    Remove(E::Id),
    /// Confirmed clear.
    Clear,
    /// A record pushed by the server (live event), appended in arrival order.
    Arrive(E),
}

/// Summary of an applied reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Records added
    pub added: usize,
    /// Records replaced in place
    pub replaced: usize,
    /// Records patched locally
    pub patched: usize,
    /// Records removed
    pub removed: usize,
    /// The targeted id was not present; nothing changed
    pub unmatched: bool,
}

impl ReconcileReport {
    /// Whether the collection changed at all.
    pub fn changed(&self) -> bool {
        self.added + self.replaced + self.patched + self.removed > 0
    }
}

impl<E: Entity> Reconciliation<E> {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Reconciliation::Replace(_) => "replace",
            Reconciliation::Insert { .. } => "insert",
            Reconciliation::Update { .. } => "update",
            Reconciliation::Remove(_) => "remove",
            Reconciliation::Clear => "clear",
            Reconciliation::Arrive(_) => "arrive",
        }
    }

    /// Apply to a collection.
    pub fn apply(self, collection: &mut EntityCollection<E>) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        match self {
            Reconciliation::Replace(entities) => {
                report.removed = collection.len();
                collection.replace_all(entities);
                report.added = collection.len();
            }
            Reconciliation::Insert { entity, position } => {
                record_insert(&mut report, collection.insert(entity, position));
            }
            Reconciliation::Arrive(entity) => {
                record_insert(&mut report, collection.insert(entity, Position::Append));
            }
            Reconciliation::Update {
                id,
                confirmed,
                patch,
            } => {
                let matched = match confirmed {
                    Some(entity) => {
                        let replaced = collection.replace(&id, entity);
                        if replaced {
                            report.replaced = 1;
                        }
                        replaced
                    }
                    None => {
                        let patched = collection.patch(&id, &patch);
                        if patched {
                            report.patched = 1;
                        }
                        patched
                    }
                };
                report.unmatched = !matched;
            }
            Reconciliation::Remove(id) => match collection.remove(&id) {
                Some(_) => report.removed = 1,
                None => report.unmatched = true,
            },
            Reconciliation::Clear => {
                report.removed = collection.len();
                collection.clear();
            }
        }

        report
    }
}

fn record_insert(report: &mut ReconcileReport, inserted: Inserted) {
    match inserted {
        Inserted::Added => report.added = 1,
        Inserted::Replaced => report.replaced = 1,
    }
}
