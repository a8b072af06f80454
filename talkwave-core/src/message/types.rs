//! Message data structures

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Typed or attached on this device
    LocalUser,
    /// Relayed from another client through the broker
    RemoteUser,
    /// Generated from the canned-reply catalog
    AutomatedAgent,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::LocalUser => "local_user",
            Sender::RemoteUser => "remote_user",
            Sender::AutomatedAgent => "automated_agent",
        }
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    /// Reference to an image (a `file://` URI for local attachments)
    Image(String),
    Empty,
}

impl Content {
    /// Build text content, mapping an empty string to `Empty`
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Content::Empty
        } else {
            Content::Text(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }

    /// Text form used on the wire and in terminal output
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text(text) => text,
            Content::Image(reference) => reference,
            Content::Empty => "",
        }
    }
}

/// A single entry of a chat session
///
/// Ordering is the position in the containing sequence; there is no
/// timestamp field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within a session, assigned in append order
    pub id: u64,
    pub sender: Sender,
    /// Display name carried on the wire, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: Content,
}

impl Message {
    /// Create a new message
    pub fn new(id: u64, sender: Sender, content: Content) -> Self {
        Self {
            id,
            sender,
            author: None,
            content,
        }
    }

    /// Set the display name
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Name to show next to the message
    pub fn display_name(&self) -> &str {
        match (&self.author, self.sender) {
            (Some(author), _) => author,
            (None, Sender::LocalUser) => "me",
            (None, Sender::RemoteUser) => "peer",
            (None, Sender::AutomatedAgent) => "bot",
        }
    }
}
