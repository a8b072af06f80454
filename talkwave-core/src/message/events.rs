//! Wire events exchanged with the broker
//!
//! Every WebSocket text frame carries one envelope:
//! `{"event":"message","data":{"sender":"Moi","content":"hi"}}`.

use serde::{Deserialize, Serialize};

/// Name of the only relayed event
pub const MESSAGE_EVENT: &str = "message";

/// Payload of a `message` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Display name of the author
    pub sender: String,
    pub content: String,
    /// Device id of the sending client, used to recognise echoes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl MessagePayload {
    /// Create a new payload
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            origin: None,
        }
    }

    /// Tag the payload with the sending device
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Envelope of a WebSocket frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WireEvent {
    Message(MessagePayload),
}

impl WireEvent {
    /// Encode to a text frame
    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a text frame
    pub fn decode(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WireEvent::Message(_) => MESSAGE_EVENT,
        }
    }
}

impl From<MessagePayload> for WireEvent {
    fn from(payload: MessagePayload) -> Self {
        WireEvent::Message(payload)
    }
}
