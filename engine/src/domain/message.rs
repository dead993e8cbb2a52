//! Chat messages.

use crate::validate::{require_text, Validate};
use crate::{error::Result, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Entity for Message {
    type Id = String;
    type Patch = MessagePatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &MessagePatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
    }
}

/// Outgoing message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub text: String,
}

impl SendMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Validate for SendMessage {
    fn validate(&self) -> Result<()> {
        require_text("text", &self.text)
    }
}
