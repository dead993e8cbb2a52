//! The remote-backed store.
//!
//! A [`RemoteStore`] owns the local copy of one collection of server-owned
//! records. Every action follows the same path:
//!
//! 1. A stale [`EpochToken`] short-circuits to [`Outcome::Discarded`].
//! 2. `loading` is raised and the request is dispatched. The response is
//!    raced against the token being superseded.
//! 3. The response is decoded at the boundary. The reconciliation is then
//!    computed against the collection as it is *at that moment*, and commit
//!    plus status settlement happen in a single state modification.
//!
//! Readers never see a half-applied response and a failed action never
//! touches the collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stash_engine::{
    envelope, Entity, EntityCollection, ErrorDescriptor, Position, ReconcileReport, Reconciliation,
    Status, StoreState, Validate,
};
use tokio::sync::watch;

use crate::binding::EpochToken;
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, Transport};

/// How a mutation failure reaches the caller.
///
/// Failures are recorded in `last_error` either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record only; the action returns `Ok(Outcome::Failed)`.
    #[default]
    Record,
    /// Record and return the error.
    Propagate,
}

/// What happened to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The response was applied.
    Committed,
    /// The action failed and the error was recorded.
    Failed,
    /// The token went stale; nothing was written.
    Discarded,
}

impl Outcome {
    pub fn is_committed(self) -> bool {
        self == Outcome::Committed
    }
}

/// Where a store's records live on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Collection path; single records live at `{base}/{id}`
    pub base: String,
    /// Payload key of list responses
    pub list_key: String,
    /// Payload key of single-record responses
    pub one_key: String,
    /// Where created records are inserted
    pub create_position: Position,
}

impl Routes {
    pub fn new(base: impl Into<String>, list_key: impl Into<String>, one_key: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            list_key: list_key.into(),
            one_key: one_key.into(),
            create_position: Position::Append,
        }
    }

    /// Insert created records at the front.
    pub fn prepend(mut self) -> Self {
        self.create_position = Position::Prepend;
        self
    }

    pub fn item(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{}", self.base, id)
    }
}

/// A local collection mirrored from the backend.
pub struct RemoteStore<E: Entity> {
    name: &'static str,
    transport: Arc<dyn Transport>,
    routes: Routes,
    policy: ErrorPolicy,
    state: watch::Sender<StoreState<E>>,
}

impl<E: Entity> std::fmt::Debug for RemoteStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("name", &self.name)
            .field("routes", &self.routes)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> RemoteStore<E> {
    pub fn new(
        name: &'static str,
        transport: Arc<dyn Transport>,
        routes: Routes,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            name,
            transport,
            routes,
            policy,
            state: watch::Sender::new(StoreState::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState<E> {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<E>> {
        self.state.subscribe()
    }

    /// Records in collection order.
    pub fn entities(&self) -> Vec<E> {
        self.state.borrow().entities.to_vec()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().status.loading
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entities.is_empty()
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.state.borrow().entities.get(id).cloned()
    }

    // ------------------------------------------------------------------
    // Standard actions
    // ------------------------------------------------------------------

    /// Replace the collection with the backend's list.
    ///
    /// Failures are recorded and logged, never returned.
    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        let request = ApiRequest::get(self.routes.base.clone());
        let key = self.routes.list_key.clone();
        self.fetch_with(request, &key, token).await
    }

    /// Create a record and insert the confirmed copy.
    pub async fn create<I>(&self, input: &I, token: &EpochToken) -> Result<Outcome>
    where
        I: Validate + Serialize,
    {
        let request = ApiRequest::post(self.routes.base.clone());
        let key = self.routes.one_key.clone();
        self.create_with(request, input, &key, self.routes.create_position, token)
            .await
    }

    /// Update a record. The returned record replaces the local one in place;
    /// a status-only confirmation applies `patch` locally.
    pub async fn update_one(&self, id: &E::Id, patch: &E::Patch, token: &EpochToken) -> Result<Outcome>
    where
        E::Patch: Validate,
    {
        let request = ApiRequest::patch(self.routes.item(id));
        let key = self.routes.one_key.clone();
        self.update_with(request, patch, id.clone(), patch.clone(), &key, token)
            .await
    }

    /// Delete a record. Removing an id that is not present is a no-op.
    pub async fn remove_one(&self, id: &E::Id, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::delete(self.routes.item(id));
        self.remove_with(request, id.clone(), token).await
    }

    /// Delete every record on the backend, then locally.
    pub async fn clear(&self, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::delete(self.routes.base.clone());
        self.execute(token, "clear", request, acknowledged, |_, _| {
            Some(Reconciliation::Clear)
        })
        .await
    }

    /// Drop the local copy without contacting the backend.
    pub fn clear_local(&self) {
        self.state.send_modify(|state| state.entities.clear());
        tracing::debug!(store = self.name, "Cleared local copy");
    }

    // ------------------------------------------------------------------
    // Building blocks for domain stores
    // ------------------------------------------------------------------

    /// Fetch a list from `request` and replace the collection with it.
    pub async fn fetch_with(&self, request: ApiRequest, key: &str, token: &EpochToken) -> Outcome {
        self.fetch_scoped(request, key, token, || true).await
    }

    /// Like [`fetch_with`](Self::fetch_with), but the result is only written
    /// while `scope` holds. `scope` is checked before dispatch and again
    /// inside the commit, so a result that falls out of scope in flight is
    /// discarded like a stale epoch.
    pub async fn fetch_scoped<S>(&self, request: ApiRequest, key: &str, token: &EpochToken, scope: S) -> Outcome
    where
        S: Fn() -> bool + Send + Sync,
    {
        let result = self
            .perform(
                token,
                &scope,
                "fetch",
                request,
                |body| envelope::decode_payload::<Vec<E>>(body, key),
                |entities, _| Some(Reconciliation::Replace(entities)),
            )
            .await;

        result.unwrap_or(Outcome::Failed)
    }

    /// Send `input` with `request` and insert the record returned under `key`.
    pub async fn create_with<I>(
        &self,
        request: ApiRequest,
        input: &I,
        key: &str,
        position: Position,
        token: &EpochToken,
    ) -> Result<Outcome>
    where
        I: Validate + Serialize,
    {
        let request = match self.prepare(request, input) {
            Ok(request) => request,
            Err(e) => return self.reject(e),
        };

        self.execute(
            token,
            "create",
            request,
            |body| envelope::decode_payload::<E>(body, key),
            |entity, _| Some(Reconciliation::Insert { entity, position }),
        )
        .await
    }

    /// Send `body` with `request` and reconcile record `id`.
    ///
    /// Uses the record under `key` when the backend returns one, otherwise
    /// applies `patch`.
    pub async fn update_with<B>(
        &self,
        request: ApiRequest,
        body: &B,
        id: E::Id,
        patch: E::Patch,
        key: &str,
        token: &EpochToken,
    ) -> Result<Outcome>
    where
        B: Validate + Serialize,
    {
        let request = match self.prepare(request, body) {
            Ok(request) => request,
            Err(e) => return self.reject(e),
        };

        self.execute(
            token,
            "update",
            request,
            |body| envelope::optional_payload::<E>(body, key),
            |confirmed, _| {
                Some(Reconciliation::Update {
                    id,
                    confirmed,
                    patch,
                })
            },
        )
        .await
    }

    /// Send `request` and remove record `id` on success.
    pub async fn remove_with(&self, request: ApiRequest, id: E::Id, token: &EpochToken) -> Result<Outcome> {
        self.execute(token, "remove", request, acknowledged, |_, _| {
            Some(Reconciliation::Remove(id))
        })
        .await
    }

    /// Send a request whose success carries no record.
    ///
    /// `reconcile` sees the collection at commit time and decides the local
    /// change, if any.
    pub async fn confirm_with<B, R>(
        &self,
        request: ApiRequest,
        body: Option<&B>,
        reconcile: R,
        token: &EpochToken,
    ) -> Result<Outcome>
    where
        B: Validate + Serialize,
        R: FnOnce(&EntityCollection<E>) -> Option<Reconciliation<E>>,
    {
        let request = match body {
            Some(body) => match self.prepare(request, body) {
                Ok(request) => request,
                Err(e) => return self.reject(e),
            },
            None => request,
        };

        self.execute(token, "confirm", request, acknowledged, |_, current| {
            reconcile(current)
        })
        .await
    }

    /// Run an arbitrary action with this store's error policy applied.
    ///
    /// `decode` turns the response body into a typed payload; `reconcile`
    /// maps it onto the collection as it is when the response lands.
    pub async fn execute<T, D, R>(
        &self,
        token: &EpochToken,
        action: &'static str,
        request: ApiRequest,
        decode: D,
        reconcile: R,
    ) -> Result<Outcome>
    where
        D: FnOnce(&Value) -> stash_engine::Result<T>,
        R: FnOnce(T, &EntityCollection<E>) -> Option<Reconciliation<E>>,
    {
        let result = self.perform(token, &|| true, action, request, decode, reconcile).await;
        self.apply_policy(result)
    }

    /// Apply a change that did not come from a request (a live event, a
    /// local edit), unless `token` is stale.
    pub fn apply_local(&self, reconciliation: Reconciliation<E>, token: &EpochToken) -> Outcome {
        let label = reconciliation.label();
        let mut outcome = Outcome::Discarded;

        self.state.send_if_modified(|state| {
            if !token.is_current() {
                return false;
            }
            let report = reconciliation.apply(&mut state.entities);
            outcome = Outcome::Committed;
            report.changed()
        });

        tracing::trace!(store = self.name, change = label, outcome = ?outcome, "Local change");
        outcome
    }

    /// Record a failure that happened before any request was made.
    pub fn reject(&self, error: ClientError) -> Result<Outcome> {
        let descriptor = error.descriptor();
        tracing::warn!(store = self.name, error = %descriptor, "Action rejected");
        self.state
            .send_modify(|state| state.status.last_error = Some(descriptor));
        self.apply_policy(Err(error))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn prepare<B>(&self, request: ApiRequest, body: &B) -> Result<ApiRequest>
    where
        B: Validate + Serialize,
    {
        body.validate()?;
        request.json(body)
    }

    fn apply_policy(&self, result: Result<Outcome>) -> Result<Outcome> {
        match (result, self.policy) {
            (Err(_), ErrorPolicy::Record) => Ok(Outcome::Failed),
            (other, _) => other,
        }
    }

    /// Dispatch, decode and commit. Errors are recorded before being
    /// returned.
    async fn perform<T, D, R>(
        &self,
        token: &EpochToken,
        scope: &(dyn Fn() -> bool + Send + Sync),
        action: &'static str,
        request: ApiRequest,
        decode: D,
        reconcile: R,
    ) -> Result<Outcome>
    where
        D: FnOnce(&Value) -> stash_engine::Result<T>,
        R: FnOnce(T, &EntityCollection<E>) -> Option<Reconciliation<E>>,
    {
        let current = || token.is_current() && scope();
        if !current() {
            tracing::debug!(store = self.name, action, epoch = token.epoch(), "Stale token, not dispatching");
            return Ok(Outcome::Discarded);
        }

        let path = request.path.clone();
        let in_flight = InFlight::begin(&self.state);
        tracing::debug!(store = self.name, action, path = %path, epoch = token.epoch(), "Dispatching");

        let response = tokio::select! {
            _ = token.superseded() => None,
            response = self.transport.send(request) => Some(response),
        };

        let Some(response) = response else {
            in_flight.settle(|status| status.abandon());
            tracing::debug!(store = self.name, action, path = %path, "Superseded while in flight");
            return Ok(Outcome::Discarded);
        };

        let decoded = response.and_then(|body| decode(&body).map_err(ClientError::from));

        match decoded {
            Ok(payload) => {
                let mut report: Option<ReconcileReport> = None;
                let mut outcome = Outcome::Discarded;

                in_flight.finish(|state| {
                    if !current() {
                        state.status.abandon();
                        return;
                    }
                    outcome = Outcome::Committed;
                    match reconcile(payload, &state.entities) {
                        Some(reconciliation) => report = Some(state.commit(reconciliation)),
                        None => state.status.succeed(),
                    }
                });

                match &report {
                    Some(report) => tracing::debug!(
                        store = self.name,
                        action,
                        path = %path,
                        added = report.added,
                        replaced = report.replaced,
                        patched = report.patched,
                        removed = report.removed,
                        unmatched = report.unmatched,
                        outcome = ?outcome,
                        "Action settled"
                    ),
                    None => tracing::debug!(store = self.name, action, path = %path, outcome = ?outcome, "Action settled"),
                }
                Ok(outcome)
            }
            Err(error) => {
                let descriptor: ErrorDescriptor = error.descriptor();
                let mut recorded = false;

                in_flight.finish(|state| {
                    if current() {
                        state.status.fail(descriptor.clone());
                        recorded = true;
                    } else {
                        state.status.abandon();
                    }
                });

                if !recorded {
                    tracing::debug!(store = self.name, action, path = %path, "Failure after token went stale, discarded");
                    return Ok(Outcome::Discarded);
                }

                tracing::warn!(store = self.name, action, path = %path, error = %descriptor, "Action failed");
                Err(error)
            }
        }
    }
}

/// An action between `begin()` and settlement.
///
/// Dropping it unsettled (the action future was cancelled) abandons the
/// action so `loading` cannot stay raised.
struct InFlight<'a, E: Entity> {
    state: &'a watch::Sender<StoreState<E>>,
    settled: bool,
}

impl<'a, E: Entity> InFlight<'a, E> {
    fn begin(state: &'a watch::Sender<StoreState<E>>) -> Self {
        state.send_modify(|state| state.status.begin());
        Self {
            state,
            settled: false,
        }
    }

    /// Settle the status only.
    fn settle(self, settle: impl FnOnce(&mut Status)) {
        self.finish(|state| settle(&mut state.status));
    }

    /// Settle with a modification that must settle the status itself.
    fn finish(mut self, modify: impl FnOnce(&mut StoreState<E>)) {
        self.settled = true;
        self.state.send_modify(modify);
    }
}

impl<E: Entity> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_modify(|state| state.status.abandon());
        }
    }
}

/// Decoder for responses that carry no payload.
fn acknowledged(body: &Value) -> stash_engine::Result<()> {
    envelope::ensure_success(body).map(|_| ())
}
