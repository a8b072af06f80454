//! In-process transport

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use talkwave_core::MessagePayload;

use crate::base::{ReceiveHandler, Result, TransportClient, TransportError};

/// Transport that never leaves the process
///
/// Records every sent payload and, when echo is on, hands it straight back
/// to the registered handlers the way a broker echoes to its sender.
/// [`LoopbackTransport::inject`] simulates a payload from another client.
#[derive(Default)]
pub struct LoopbackTransport {
    echo: bool,
    sent: Mutex<Vec<MessagePayload>>,
    handlers: RwLock<Vec<ReceiveHandler>>,
    closed: AtomicBool,
    fail_sends: AtomicBool,
}

impl LoopbackTransport {
    /// Transport that records sends without echoing them
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that echoes every send back to its handlers
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Deliver a payload as if it came from the broker
    pub fn inject(&self, payload: MessagePayload) {
        let current: Vec<ReceiveHandler> = self.handlers.read().clone();
        for handler in current {
            handler(payload.clone());
        }
    }

    /// Payloads sent so far
    pub fn sent(&self) -> Vec<MessagePayload> {
        self.sent.lock().clone()
    }

    /// Make subsequent sends fail
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransportClient for LoopbackTransport {
    async fn send(&self, payload: MessagePayload) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("injected send failure".to_string()));
        }

        self.sent.lock().push(payload.clone());
        if self.echo {
            self.inject(payload);
        }
        Ok(())
    }

    fn on_receive(&self, handler: ReceiveHandler) {
        self.handlers.write().push(handler);
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}
