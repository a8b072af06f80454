//! Base trait for transport clients

use async_trait::async_trait;
use std::sync::Arc;
use talkwave_core::MessagePayload;

/// Callback invoked once per inbound `message` event
///
/// Handlers run on the transport's dispatch task, in arrival order. They
/// should hand the payload off quickly; a slow handler delays later
/// events but never the socket read loop.
pub type ReceiveHandler = Arc<dyn Fn(MessagePayload) + Send + Sync>;

/// Trait for broker connections
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Transmit a payload; fire-and-forget, no acknowledgment
    async fn send(&self, payload: MessagePayload) -> Result<()>;

    /// Register a handler for inbound events
    fn on_receive(&self, handler: ReceiveHandler);

    /// Release the connection; later sends fail with `ConnectionClosed`
    async fn close(&self) -> Result<()>;

    /// Whether the connection is still usable
    fn is_connected(&self) -> bool;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
