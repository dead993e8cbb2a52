//! Unified error handling for the client.

use stash_engine::{ErrorDescriptor, ErrorKind};

use crate::config::ConfigError;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Engine error: {0}")]
    Engine(#[from] stash_engine::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The descriptor recorded in a store's `last_error`.
    pub fn descriptor(&self) -> ErrorDescriptor {
        match self {
            ClientError::Transport(e) => ErrorDescriptor::new(ErrorKind::Transport, e.to_string()),
            ClientError::Status { status, message } => {
                ErrorDescriptor::new(ErrorKind::Transport, format!("HTTP {}: {}", status, message))
            }
            // The backend's own message is what a user should see
            ClientError::Engine(stash_engine::Error::Application(message)) => {
                ErrorDescriptor::new(ErrorKind::Application, message.clone())
            }
            ClientError::Engine(e) => ErrorDescriptor::from(e),
            ClientError::Encode(e) => ErrorDescriptor::new(ErrorKind::Validation, e.to_string()),
            ClientError::Config(e) => ErrorDescriptor::new(ErrorKind::Validation, e.to_string()),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.descriptor().kind
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
