//! Canned replies for the auto-reply mode

pub mod catalog;
pub mod engine;

pub use catalog::ResponseCatalog;
pub use engine::ResponseEngine;

/// Reply selection errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("response catalog is empty")]
    EmptyCatalog,

    #[error("invalid response catalog: {0}")]
    InvalidCatalog(String),
}
