//! # Stash Client
//!
//! Async remote-backed stores over a REST backend.
//!
//! [`AppContext`] builds every store once over a shared [`Transport`].
//! Stores run actions tagged with an [`EpochToken`]; a [`Binding`] hands
//! out tokens tied to a consumer's lifetime so results arriving after it
//! is gone are discarded. Live events reach stores through a shared
//! [`LiveHub`](live::LiveHub).
//!
//! ```no_run
//! use stash_client::{AppContext, ClientConfig, EpochToken};
//!
//! # async fn run() -> Result<(), stash_client::ClientError> {
//! let config = ClientConfig::new("http://localhost:4000").with_session_cookie("token=abc");
//! let context = AppContext::new(&config)?;
//!
//! context.bootstrap().await;
//! context.refresh_all(&EpochToken::detached()).await;
//!
//! for food in context.foods.foods() {
//!     println!("{} - {}", food.name, food.price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod live;
pub mod store;
pub mod stores;
pub mod transport;

pub use binding::{Binding, EpochToken};
pub use config::{ClientConfig, ConfigError};
pub use context::{AppContext, RefreshReport, StoreSummary};
pub use error::{ClientError, Result};
pub use store::{ErrorPolicy, Outcome, RemoteStore, Routes};
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
