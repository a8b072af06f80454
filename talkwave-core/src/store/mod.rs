//! Local snapshot of the conversation
//!
//! A store holds exactly one ordered message sequence per key and every
//! save replaces the whole document. Callers decide what a failure means;
//! the chat session logs it and keeps running in memory.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::message::Message;

pub use file::FileMessageStore;
pub use memory::MemoryMessageStore;

/// Key under which the conversation snapshot is stored
pub const SNAPSHOT_KEY: &str = "chatMessages";

/// Snapshot load/save errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read snapshot: {0}")]
    Read(String),

    #[error("failed to write snapshot: {0}")]
    Write(String),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable storage for the ordered message sequence
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Load the stored sequence; an absent snapshot is an empty sequence
    async fn load(&self) -> Result<Vec<Message>>;

    /// Replace the stored sequence
    async fn save(&self, messages: &[Message]) -> Result<()>;
}
