//! Application context.
//!
//! Every store is created once, here, and shared through `Arc`s. Consumers
//! receive the context (or the stores they need) explicitly instead of
//! reaching for globals.

use std::sync::Arc;

use serde::Serialize;
use stash_engine::Status;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::binding::EpochToken;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::live::{self, LiveHub};
use crate::store::{ErrorPolicy, Outcome};
use crate::stores::{
    CartStore, ChatStore, CourseStore, FoodStore, JobStore, OrderStore, PostStore, SessionStore,
};
use crate::transport::{HttpTransport, Transport};

/// Owns the shared transport, the live hub and every store.
pub struct AppContext {
    transport: Arc<dyn Transport>,
    live: watch::Sender<Option<Arc<LiveHub>>>,
    pub cart: Arc<CartStore>,
    pub session: Arc<SessionStore>,
    pub foods: Arc<FoodStore>,
    pub orders: Arc<OrderStore>,
    pub chat: Arc<ChatStore>,
    pub jobs: Arc<JobStore>,
    pub courses: Arc<CourseStore>,
    pub posts: Arc<PostStore>,
}

impl AppContext {
    /// Build the context with an HTTP transport.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport, config.error_policy))
    }

    /// Build the context over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        Self {
            cart: Arc::new(CartStore::new()),
            session: Arc::new(SessionStore::new(transport.clone(), policy)),
            foods: Arc::new(FoodStore::new(transport.clone(), policy)),
            orders: Arc::new(OrderStore::new(transport.clone(), policy)),
            chat: Arc::new(ChatStore::new(transport.clone(), policy)),
            jobs: Arc::new(JobStore::new(transport.clone(), policy)),
            courses: Arc::new(CourseStore::new(transport.clone(), policy)),
            posts: Arc::new(PostStore::new(transport.clone(), policy)),
            live: watch::Sender::new(None),
            transport,
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Load the session. Runs once at startup, before anything that depends
    /// on the signed-in user.
    pub async fn bootstrap(&self) -> Outcome {
        let outcome = self.session.load_current(&EpochToken::detached()).await;
        match self.session.current() {
            Some(user) => tracing::info!(user = %user.id, "Session loaded"),
            None => tracing::info!(outcome = ?outcome, "No active session"),
        }
        outcome
    }

    /// Make a live hub available to listeners.
    pub fn attach_live(&self, hub: Arc<LiveHub>) {
        self.live.send_replace(Some(hub));
    }

    /// The live hub, once attached.
    pub fn live(&self) -> Option<Arc<LiveHub>> {
        self.live.borrow().clone()
    }

    /// Create a hub, attach it and stream server-sent events into it in the
    /// background.
    pub fn connect_live(&self, config: &ClientConfig) -> JoinHandle<Result<usize>> {
        let hub = LiveHub::new_shared();
        self.attach_live(hub.clone());

        let config = config.clone();
        tokio::spawn(async move {
            let result = live::connect_sse(&hub, &config).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Live stream failed");
            }
            result
        })
    }

    /// Start the chat listener as soon as a hub is attached.
    ///
    /// The returned task resolves to the number of appended messages, or
    /// zero if `token` is superseded before a hub shows up.
    pub fn listen_chat(&self, token: EpochToken) -> JoinHandle<usize> {
        let mut live = self.live.subscribe();
        let chat = self.chat.clone();

        tokio::spawn(async move {
            let hub = loop {
                let attached = live.borrow_and_update().clone();
                if let Some(hub) = attached {
                    break hub;
                }
                tokio::select! {
                    _ = token.superseded() => return 0,
                    changed = live.changed() => {
                        if changed.is_err() {
                            return 0;
                        }
                    }
                }
            };

            chat.listen(&hub, token).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Chat listener task failed");
                0
            })
        })
    }

    /// Fetch every remote store concurrently.
    pub async fn refresh_all(&self, token: &EpochToken) -> RefreshReport {
        let (foods, orders, chat, jobs, courses, posts) = tokio::join!(
            self.foods.fetch_all(token),
            self.orders.fetch_all(token),
            self.chat.fetch_all(token),
            self.jobs.fetch_all(token),
            self.courses.fetch_all(token),
            self.posts.fetch_all(token),
        );

        RefreshReport {
            foods,
            orders,
            chat,
            jobs,
            courses,
            posts,
        }
    }

    /// Count and status of every store.
    pub fn summary(&self) -> Vec<StoreSummary> {
        vec![
            StoreSummary::new("session", self.session.store().len(), self.session.status()),
            StoreSummary::new("cart", self.cart.len(), Status::default()),
            StoreSummary::new("foods", self.foods.store().len(), self.foods.store().status()),
            StoreSummary::new("orders", self.orders.store().len(), self.orders.store().status()),
            StoreSummary::new("chat", self.chat.store().len(), self.chat.store().status()),
            StoreSummary::new("jobs", self.jobs.store().len(), self.jobs.store().status()),
            StoreSummary::new("courses", self.courses.store().len(), self.courses.store().status()),
            StoreSummary::new("posts", self.posts.store().len(), self.posts.store().status()),
        ]
    }
}

/// Outcome of each fetch in [`AppContext::refresh_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub foods: Outcome,
    pub orders: Outcome,
    pub chat: Outcome,
    pub jobs: Outcome,
    pub courses: Outcome,
    pub posts: Outcome,
}

/// One line of [`AppContext::summary`].
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub store: &'static str,
    pub count: usize,
    #[serde(flatten)]
    pub status: Status,
}

impl StoreSummary {
    fn new(store: &'static str, count: usize, status: Status) -> Self {
        Self {
            store,
            count,
            status,
        }
    }
}
