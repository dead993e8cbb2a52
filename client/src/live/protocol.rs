//! Live event framing.
//!
//! Events arrive as server-sent events:
//!
//! ```text
//! event: newMessage
//! data: {"_id": "m1", "text": "hi"}
//!
//! ```
//!
//! `data` is JSON. An unnamed event whose data is itself a
//! `{"event": ..., "payload": ...}` object is unwrapped, so backends that
//! multiplex over the default event name work too.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event carrying a chat message addressed to the signed-in user.
pub const NEW_MESSAGE_EVENT: &str = "newMessage";

/// Event name used by the SSE format when none is given.
const DEFAULT_EVENT: &str = "message";

/// One named event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFrame {
    pub event: String,
    pub payload: Value,
}

impl LiveFrame {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// Incremental decoder for a `text/event-stream` body.
///
/// Bytes may be fed in arbitrary chunks; complete frames are returned as
/// soon as their terminating blank line has been seen.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
    retry: Option<Duration>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last `id:` seen, to resume from with `Last-Event-ID`.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay requested by the backend with `retry:`.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Feed a chunk and collect the frames it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LiveFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
            if let Some(frame) = self.line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn line(&mut self, line: &str) -> Option<LiveFrame> {
        if line.is_empty() {
            return self.finish();
        }
        // Comment, used as keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => {
                self.last_event_id = Some(value.to_string()).filter(|id| !id.is_empty());
            }
            "retry" => {
                if let Ok(millis) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(millis));
                }
            }
            _ => {}
        }
        None
    }

    fn finish(&mut self) -> Option<LiveFrame> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if data.is_empty() {
            return None;
        }

        let raw = data.join("\n");
        let payload = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

        match event {
            Some(event) if event != DEFAULT_EVENT => Some(LiveFrame::new(event, payload)),
            _ => match serde_json::from_value::<LiveFrame>(payload.clone()) {
                Ok(frame) => Some(frame),
                Err(_) => Some(LiveFrame::new(DEFAULT_EVENT, payload)),
            },
        }
    }
}
