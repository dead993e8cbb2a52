//! Live event hub.
//!
//! Tracks listeners per event name and fans incoming frames out to them.
//! Shared across stores via `Arc`; no store owns it.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use super::LiveFrame;

/// Sender half held by the hub for one listener.
type PayloadSender = mpsc::UnboundedSender<Value>;

/// A single listener.
#[derive(Debug)]
struct Listener {
    event: String,
    sender: PayloadSender,
}

/// Fans live events out to subscribed listeners.
#[derive(Debug, Default)]
pub struct LiveHub {
    /// All listeners, keyed by listener ID.
    listeners: DashMap<String, Listener>,
    /// Index of listener IDs by event name.
    by_event: DashMap<String, Vec<String>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new hub wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Listen for `event`.
    ///
    /// Dropping the returned subscription removes this listener and no
    /// other.
    pub fn subscribe(self: &Arc<Self>, event: &str) -> Subscription {
        let id = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();

        self.listeners.insert(
            id.clone(),
            Listener {
                event: event.to_string(),
                sender,
            },
        );
        self.by_event
            .entry(event.to_string())
            .or_default()
            .push(id.clone());

        tracing::debug!(listener = %id, event, "Live listener registered");

        Subscription {
            id,
            event: event.to_string(),
            receiver,
            hub: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: &str) {
        if let Some((_, listener)) = self.listeners.remove(id) {
            if let Some(mut ids) = self.by_event.get_mut(&listener.event) {
                ids.retain(|other| other != id);
            }
            // Re-checked under the shard lock: a concurrent subscribe may
            // have pushed into the list since the guard above was released
            self.by_event
                .remove_if(&listener.event, |_, ids| ids.is_empty());

            tracing::debug!(listener = %id, event = %listener.event, "Live listener removed");
        }
    }

    /// Deliver `payload` to every listener of `event`.
    ///
    /// Returns the number of listeners that received it.
    pub fn dispatch(&self, event: &str, payload: Value) -> usize {
        let ids = match self.by_event.get(event) {
            Some(ids) => ids.clone(),
            None => {
                tracing::trace!(event, "No listeners for live event");
                return 0;
            }
        };

        let mut delivered = 0;
        for id in ids {
            if let Some(listener) = self.listeners.get(&id) {
                if listener.sender.send(payload.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        tracing::trace!(event, listeners = delivered, "Dispatched live event");
        delivered
    }

    /// Dispatch every frame of `frames` until it ends.
    ///
    /// Returns the number of frames consumed.
    pub async fn pump<S>(&self, frames: S) -> usize
    where
        S: Stream<Item = LiveFrame>,
    {
        let mut frames = std::pin::pin!(frames);
        let mut count = 0;
        while let Some(frame) = frames.next().await {
            self.dispatch(&frame.event, frame.payload);
            count += 1;
        }
        count
    }

    /// Number of listeners for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.by_event.get(event).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Number of events with at least one listener.
    pub fn event_count(&self) -> usize {
        self.by_event.len()
    }
}

/// One registered listener. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    event: String,
    receiver: mpsc::UnboundedReceiver<Value>,
    hub: Weak<LiveHub>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Next payload. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Value> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscribe_unsubscribe() {
        let hub = LiveHub::new_shared();

        let first = hub.subscribe("newMessage");
        let second = hub.subscribe("newMessage");
        let _other = hub.subscribe("typing");
        assert_eq!(hub.listener_count("newMessage"), 2);
        assert_eq!(hub.event_count(), 2);

        drop(first);
        assert_eq!(hub.listener_count("newMessage"), 1);

        drop(second);
        assert_eq!(hub.listener_count("newMessage"), 0);
        assert_eq!(hub.event_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_reaches_only_matching_listeners() {
        let hub = LiveHub::new_shared();
        let mut messages = hub.subscribe("newMessage");
        let mut typing = hub.subscribe("typing");

        let delivered = hub.dispatch("newMessage", json!({"_id": "m1"}));
        assert_eq!(delivered, 1);
        assert_eq!(messages.recv().await, Some(json!({"_id": "m1"})));
        assert!(typing.receiver.try_recv().is_err());

        assert_eq!(hub.dispatch("unknown", json!(null)), 0);
    }

    #[tokio::test]
    async fn test_pump_preserves_order() {
        let hub = LiveHub::new_shared();
        let mut subscription = hub.subscribe("newMessage");

        let frames = futures::stream::iter(vec![
            LiveFrame::new("newMessage", json!(1)),
            LiveFrame::new("typing", json!(true)),
            LiveFrame::new("newMessage", json!(2)),
        ]);
        assert_eq!(hub.pump(frames).await, 3);

        assert_eq!(subscription.recv().await, Some(json!(1)));
        assert_eq!(subscription.recv().await, Some(json!(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_resubscribe_during_unsubscribe_keeps_listener() {
        let hub = LiveHub::new_shared();

        for round in 0..200 {
            let old = hub.subscribe("newMessage");
            let subscriber = {
                let hub = hub.clone();
                tokio::spawn(async move { hub.subscribe("newMessage") })
            };
            let dropper = tokio::spawn(async move { drop(old) });

            dropper.await.unwrap();
            let mut current = subscriber.await.unwrap();

            assert_eq!(hub.listener_count("newMessage"), 1, "round {}", round);
            assert_eq!(hub.dispatch("newMessage", json!(round)), 1);
            assert_eq!(current.recv().await, Some(json!(round)));
        }
    }

    #[tokio::test]
    async fn test_subscription_ends_with_hub() {
        let hub = LiveHub::new_shared();
        let mut subscription = hub.subscribe("newMessage");
        drop(hub);
        assert_eq!(subscription.recv().await, None);
    }
}
