//! Real-time relay broker for talkwave
//!
//! Accepts WebSocket clients and re-broadcasts every `message` event to
//! all connected clients, the sender included. It keeps no conversation
//! state.

pub mod handlers;
pub mod server;
pub mod state;

pub use server::{router, run_server, serve};
pub use state::{BrokerState, ClientId};
