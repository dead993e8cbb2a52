//! Configuration management for the client.

use std::env;
use std::time::Duration;

use crate::store::ErrorPolicy;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default path of the server-sent event stream.
const DEFAULT_LIVE_PATH: &str = "/api/v1/live";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:4000`
    pub api_url: String,
    /// Session cookie sent with every request (`token=...`)
    pub session_cookie: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Path of the live event stream, relative to `api_url`
    pub live_path: String,
    /// How mutation failures reach callers
    pub error_policy: ErrorPolicy,
}

impl ClientConfig {
    /// Configuration for `api_url` with defaults everywhere else.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            live_path: DEFAULT_LIVE_PATH.to_string(),
            error_policy: ErrorPolicy::default(),
        }
    }

    /// Builder-style method to set the session cookie.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("STASH_API_URL").ok_or(ConfigError::MissingApiUrl)?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let request_timeout = match lookup("STASH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidTimeout)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidTimeout);
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let live_path = lookup("STASH_LIVE_PATH").unwrap_or_else(|| DEFAULT_LIVE_PATH.to_string());

        let error_policy = match lookup("STASH_ERROR_POLICY").as_deref() {
            None | Some("record") => ErrorPolicy::Record,
            Some("propagate") => ErrorPolicy::Propagate,
            Some(other) => return Err(ConfigError::InvalidErrorPolicy(other.to_string())),
        };

        Ok(Self {
            session_cookie: lookup("STASH_SESSION_COOKIE").filter(|c| !c.is_empty()),
            request_timeout,
            live_path,
            error_policy,
            ..Self::new(api_url)
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("STASH_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("Invalid STASH_API_URL value: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid STASH_TIMEOUT_SECS value")]
    InvalidTimeout,

    #[error("Invalid STASH_ERROR_POLICY value: {0} (expected 'record' or 'propagate')")]
    InvalidErrorPolicy(String),
}
