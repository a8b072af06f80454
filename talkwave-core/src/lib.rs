//! Core types and traits for talkwave
//!
//! This crate provides the message model, the wire codec, local persistence,
//! the canned-reply catalog and the attachment contract shared by the relay
//! broker and the chat client.

pub mod attachment;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod responses;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
pub use message::{Content, Message, MessagePayload, Sender, WireEvent};
