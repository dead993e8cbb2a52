//! Store status: the `loading` flag and the last recorded error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error classes a store can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Network unreachable, timeout or non-2xx status.
    Transport,
    /// The backend answered `success: false`.
    Application,
    /// The response did not match the expected envelope or payload shape.
    Decode,
    /// The input was rejected before any request was made.
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Application => write!(f, "application"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::Validation => write!(f, "validation"),
        }
    }
}

/// A recorded, cloneable description of a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl From<&crate::Error> for ErrorDescriptor {
    fn from(err: &crate::Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Network status of a store.
///
/// `loading` is true while at least one action is between dispatch and
/// response handling. Overlapping actions are counted so that the first one
/// to settle does not clear the flag for the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub loading: bool,
    pub last_error: Option<ErrorDescriptor>,
    #[serde(skip)]
    in_flight: usize,
}

impl Status {
    /// An action was dispatched.
    pub fn begin(&mut self) {
        self.in_flight += 1;
        self.loading = true;
    }

    /// An action succeeded. Clears the last error.
    pub fn succeed(&mut self) {
        self.settle();
        self.last_error = None;
    }

    /// An action failed.
    pub fn fail(&mut self, error: ErrorDescriptor) {
        self.settle();
        self.last_error = Some(error);
    }

    /// An action was discarded without a result (stale epoch).
    pub fn abandon(&mut self) {
        self.settle();
    }

    /// Number of actions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_tracks_single_action() {
        let mut status = Status::default();
        assert!(!status.loading);

        status.begin();
        assert!(status.loading);

        status.succeed();
        assert!(!status.loading);
        assert!(status.last_error.is_none());
    }

    #[test]
    fn loading_stays_until_last_settles() {
        let mut status = Status::default();
        status.begin();
        status.begin();
        assert_eq!(status.in_flight(), 2);

        status.fail(ErrorDescriptor::new(ErrorKind::Transport, "down"));
        assert!(status.loading);

        status.abandon();
        assert!(!status.loading);
        assert_eq!(
            status.last_error,
            Some(ErrorDescriptor::new(ErrorKind::Transport, "down"))
        );
    }

    #[test]
    fn success_clears_error() {
        let mut status = Status::default();
        status.begin();
        status.fail(ErrorDescriptor::new(ErrorKind::Application, "nope"));
        status.begin();
        status.succeed();
        assert!(status.last_error.is_none());
    }

    #[test]
    fn settle_without_begin_does_not_underflow() {
        let mut status = Status::default();
        status.abandon();
        assert_eq!(status.in_flight(), 0);
        assert!(!status.loading);
    }

    #[test]
    fn descriptor_display() {
        let descriptor = ErrorDescriptor::new(ErrorKind::Decode, "bad shape");
        assert_eq!(descriptor.to_string(), "decode error: bad shape");

        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, r#"{"kind":"decode","message":"bad shape"}"#);
    }
}
