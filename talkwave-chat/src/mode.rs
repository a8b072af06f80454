//! Session construction parameters

use std::fmt;
use std::sync::Arc;
use talkwave_core::responses::ResponseCatalog;
use talkwave_transport::TransportClient;
use uuid::Uuid;

/// Where submitted text goes
///
/// The two variants are mutually exclusive: a relayed session never
/// auto-replies and an auto-reply session never touches the network.
#[derive(Clone)]
pub enum SessionMode {
    /// Send through the broker
    Relay(Arc<dyn TransportClient>),
    /// Answer locally from the canned catalog
    AutoReply(Arc<ResponseCatalog>),
}

impl SessionMode {
    pub fn name(&self) -> &'static str {
        match self {
            SessionMode::Relay(_) => "relay",
            SessionMode::AutoReply(_) => "auto-reply",
        }
    }
}

impl fmt::Debug for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Relay(transport) => f
                .debug_struct("Relay")
                .field("connected", &transport.is_connected())
                .finish(),
            SessionMode::AutoReply(catalog) => f
                .debug_struct("AutoReply")
                .field("replies", &catalog.len())
                .finish(),
        }
    }
}

/// Identity of the local participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Name attached to outgoing messages
    pub display_name: String,
    /// Tags outgoing payloads so their broker echo can be recognised
    pub device_id: String,
}

impl SessionSettings {
    /// Settings with a fresh random device id
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            device_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }
}
