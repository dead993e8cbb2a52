//! Session store: the signed-in user.

use std::sync::Arc;

use stash_engine::domain::{User, UserPatch};
use stash_engine::{envelope, Error, Reconciliation, Status};

use crate::binding::EpochToken;
use crate::error::Result;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

const CURRENT_USER_PATH: &str = "/api/v1/user/me";
const PROFILE_EDIT_PATH: &str = "/api/v1/user/profile/edit";

/// Holds at most one record: the user the session cookie belongs to.
#[derive(Debug)]
pub struct SessionStore {
    users: RemoteStore<User>,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new(CURRENT_USER_PATH, "user", "user");
        Self {
            users: RemoteStore::new("session", transport, routes, policy),
        }
    }

    /// Load the signed-in user. Called once at bootstrap.
    ///
    /// A response without a user signs the session out locally. Failures are
    /// recorded, never returned.
    pub async fn load_current(&self, token: &EpochToken) -> Outcome {
        let result = self
            .users
            .execute(
                token,
                "load_current",
                ApiRequest::get(CURRENT_USER_PATH),
                |body| envelope::optional_payload::<User>(body, "user"),
                |user, _| match user {
                    Some(user) => Some(Reconciliation::Replace(vec![user])),
                    None => Some(Reconciliation::Clear),
                },
            )
            .await;

        result.unwrap_or(Outcome::Failed)
    }

    /// Edit the signed-in user's profile.
    pub async fn update_profile(&self, patch: &UserPatch, token: &EpochToken) -> Result<Outcome> {
        let Some(user) = self.current() else {
            return self
                .users
                .reject(Error::EntityNotFound("signed-in user".into()).into());
        };

        self.users
            .update_with(
                ApiRequest::post(PROFILE_EDIT_PATH),
                patch,
                user.id,
                patch.clone(),
                "user",
                token,
            )
            .await
    }

    /// The signed-in user, if any.
    pub fn current(&self) -> Option<User> {
        self.users.entities().into_iter().next()
    }

    pub fn is_signed_in(&self) -> bool {
        !self.users.is_empty()
    }

    /// Forget the user locally (logout).
    pub fn clear(&self) {
        self.users.clear_local();
    }

    pub fn status(&self) -> Status {
        self.users.status()
    }

    pub fn store(&self) -> &RemoteStore<User> {
        &self.users
    }
}
