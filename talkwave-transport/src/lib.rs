//! Client-side real-time transport for talkwave
//!
//! A transport owns one duplex connection to the broker. The chat session
//! only sees the [`TransportClient`] trait, so tests can swap in
//! [`LoopbackTransport`].

pub mod base;
pub mod loopback;
pub mod offline;
pub mod websocket;

pub use base::{ReceiveHandler, Result, TransportClient, TransportError};
pub use loopback::LoopbackTransport;
pub use offline::OfflineTransport;
pub use websocket::WsTransport;
