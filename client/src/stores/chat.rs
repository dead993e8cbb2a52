//! Chat store: the conversation with the selected user.

use std::sync::Arc;

use stash_engine::domain::{Message, SendMessage};
use stash_engine::{Error, Position, Reconciliation};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::binding::EpochToken;
use crate::error::Result;
use crate::live::{LiveHub, NEW_MESSAGE_EVENT};
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

/// Messages exchanged with [`selected_user`](ChatStore::selected_user),
/// in arrival order.
#[derive(Debug)]
pub struct ChatStore {
    messages: RemoteStore<Message>,
    selected_user: watch::Sender<Option<String>>,
}

impl ChatStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new("/api/v1/message", "messages", "newMessage");
        Self {
            messages: RemoteStore::new("chat", transport, routes, policy),
            selected_user: watch::Sender::new(None),
        }
    }

    /// Switch the conversation. Switching to another user drops the loaded
    /// messages.
    pub fn select_user(&self, user_id: Option<String>) {
        let changed = self.selected_user.send_if_modified(|selected| {
            if *selected == user_id {
                return false;
            }
            *selected = user_id.clone();
            true
        });

        if changed {
            self.messages.clear_local();
            tracing::debug!(store = "chat", user = ?user_id, "Selected user changed");
        }
    }

    pub fn selected_user(&self) -> Option<String> {
        self.selected_user.borrow().clone()
    }

    /// Receiver notified when the selection changes.
    pub fn subscribe_selection(&self) -> watch::Receiver<Option<String>> {
        self.selected_user.subscribe()
    }

    /// Load the conversation with the selected user. Does nothing when no
    /// user is selected.
    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        match self.selected_user() {
            Some(user_id) => self.fetch_conversation(&user_id, token).await,
            None => {
                tracing::debug!(store = "chat", "No user selected, nothing to fetch");
                Outcome::Discarded
            }
        }
    }

    /// Load the conversation with `user_id`.
    ///
    /// The result is only written while `user_id` is still the selected
    /// user; a response for a conversation switched away from is discarded.
    pub async fn fetch_conversation(&self, user_id: &str, token: &EpochToken) -> Outcome {
        let request = ApiRequest::get(format!("{}/all/{}", self.messages.routes().base, user_id));
        let selected = || self.selected_user.borrow().as_deref() == Some(user_id);
        self.messages
            .fetch_scoped(request, "messages", token, selected)
            .await
    }

    /// Send a message to the selected user and append the confirmed copy.
    pub async fn send(&self, text: &str, token: &EpochToken) -> Result<Outcome> {
        let Some(user_id) = self.selected_user() else {
            return self
                .messages
                .reject(Error::validation("receiver", "no user selected").into());
        };

        let request = ApiRequest::post(format!("{}/send/{}", self.messages.routes().base, user_id));
        self.messages
            .create_with(
                request,
                &SendMessage::new(text),
                "newMessage",
                Position::Append,
                token,
            )
            .await
    }

    /// Append `newMessage` events from `hub` until `token` is superseded.
    ///
    /// Malformed payloads are logged and skipped. The task resolves to the
    /// number of messages appended; its subscription ends with it.
    pub fn listen(self: &Arc<Self>, hub: &Arc<LiveHub>, token: EpochToken) -> JoinHandle<usize> {
        let mut subscription = hub.subscribe(NEW_MESSAGE_EVENT);
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut appended = 0;
            loop {
                let payload = tokio::select! {
                    _ = token.superseded() => break,
                    payload = subscription.recv() => match payload {
                        Some(payload) => payload,
                        None => break,
                    },
                };

                match serde_json::from_value::<Message>(payload) {
                    Ok(message) => {
                        let outcome = store
                            .messages
                            .apply_local(Reconciliation::Arrive(message), &token);
                        if outcome.is_committed() {
                            appended += 1;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(store = "chat", error = %e, "Skipping malformed live message");
                    }
                }
            }

            tracing::debug!(store = "chat", appended, epoch = token.epoch(), "Live listener stopped");
            appended
        })
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.entities()
    }

    pub fn store(&self) -> &RemoteStore<Message> {
        &self.messages
    }
}
