//! Image and audio attachment collaborator
//!
//! The chat session only needs a narrow contract: pick an image reference
//! (or learn that the user cancelled) and start/stop an audio capture.
//! Platform pickers and recorders implement [`AttachmentSource`].

pub mod local;

use async_trait::async_trait;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub use local::LocalAttachmentSource;

/// Picker and recorder errors
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("image not available: {0}")]
    ImageUnavailable(String),

    #[error("recorder failed to start: {0}")]
    RecorderStart(String),

    #[error("recorder failed to stop: {0}")]
    RecorderStop(String),
}

pub type Result<T> = std::result::Result<T, AttachmentError>;

/// An in-progress audio capture
///
/// Consumed by [`AttachmentSource::stop_recording`], so a stopped capture
/// cannot be stopped twice.
#[derive(Debug)]
pub struct RecordingSession {
    id: Uuid,
    started_at: Instant,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a stopped capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    pub id: Uuid,
    pub duration: Duration,
}

/// External image picker and audio recorder
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// Ask for an image; `Ok(None)` means the user cancelled
    async fn pick_image(&self) -> Result<Option<String>>;

    /// Begin an audio capture
    async fn start_recording(&self) -> Result<RecordingSession>;

    /// End an audio capture
    async fn stop_recording(&self, session: RecordingSession) -> Result<RecordingSummary>;
}
