//! Stand-in for a broker that could not be reached

use async_trait::async_trait;
use talkwave_core::MessagePayload;
use tracing::debug;

use crate::base::{ReceiveHandler, Result, TransportClient, TransportError};

/// Transport that is never connected
///
/// Lets a relay session keep appending and persisting locally when the
/// first connect failed. Every send fails with
/// [`TransportError::ConnectionClosed`] and no event is ever delivered.
#[derive(Debug, Clone)]
pub struct OfflineTransport {
    endpoint: String,
}

impl OfflineTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint that was unreachable
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TransportClient for OfflineTransport {
    async fn send(&self, _payload: MessagePayload) -> Result<()> {
        debug!("Dropping send, broker {} unreachable", self.endpoint);
        Err(TransportError::ConnectionClosed)
    }

    fn on_receive(&self, _handler: ReceiveHandler) {}

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}
