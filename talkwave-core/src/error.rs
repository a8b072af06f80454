//! Error types for talkwave

use thiserror::Error;

use crate::attachment::AttachmentError;
use crate::responses::ResponseError;
use crate::store::StoreError;

/// The main error type for talkwave operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot load/save failures
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// Canned-reply selection failures
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Image picker or recorder failures
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for talkwave operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
