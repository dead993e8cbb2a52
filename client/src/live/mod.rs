//! Live updates pushed by the backend.
//!
//! The backend pushes named events (`newMessage`, ...) over a long-lived
//! server-sent event stream. A single [`LiveHub`] is shared by the whole
//! application: [`connect_sse`] feeds it and stores subscribe to the events
//! they care about. Dropping a [`Subscription`] removes that one listener;
//! the hub and its connection stay up.

mod hub;
mod protocol;
mod stream;

pub use hub::{LiveHub, Subscription};
pub use protocol::{LiveFrame, SseDecoder, NEW_MESSAGE_EVENT};
pub use stream::connect_sse;
