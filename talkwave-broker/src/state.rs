use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifier of one broker connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outgoing frame queue of one client
pub type ClientOutbox = mpsc::UnboundedReceiver<String>;

/// The broadcast set
///
/// Fan-out runs under one lock, so concurrent broadcasts are serialized and
/// every client sees frames in the same order.
#[derive(Clone, Default)]
pub struct BrokerState {
    clients: Arc<Mutex<HashMap<ClientId, mpsc::UnboundedSender<String>>>>,
}

impl BrokerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client to the broadcast set
    pub fn register(&self) -> (ClientId, ClientOutbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ClientId::new();
        self.clients.lock().insert(id, tx);
        (id, rx)
    }

    /// Remove a client; peers are not notified
    pub fn unregister(&self, id: ClientId) -> bool {
        self.clients.lock().remove(&id).is_some()
    }

    /// Queue `frame` for every connected client, returning how many got it
    pub fn broadcast(&self, frame: &str) -> usize {
        let mut clients = self.clients.lock();
        // A closed queue means the connection is on its way out
        clients.retain(|_, tx| tx.send(frame.to_string()).is_ok());
        clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}
