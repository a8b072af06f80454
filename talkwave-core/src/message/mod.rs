//! Chat message model and the real-time wire format
//!
//! `types` holds what the client keeps in its session and snapshot;
//! `events` holds what travels between a client and the broker.

pub mod events;
pub mod types;

pub use events::{MessagePayload, WireEvent, MESSAGE_EVENT};
pub use types::{Content, Message, Sender};
