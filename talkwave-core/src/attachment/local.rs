//! Filesystem-backed attachment source for terminal clients

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{AttachmentError, AttachmentSource, RecordingSession, RecordingSummary, Result};

/// Resolves staged file paths to `file://` references
///
/// A terminal has no picker dialog, so the caller stages the chosen path
/// with [`LocalAttachmentSource::select`] before the session asks for it.
/// Recording only tracks capture boundaries.
#[derive(Debug, Default)]
pub struct LocalAttachmentSource {
    staged: Mutex<Option<PathBuf>>,
}

impl LocalAttachmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the image returned by the next `pick_image`
    pub fn select<P: AsRef<Path>>(&self, path: P) {
        *self.staged.lock() = Some(path.as_ref().to_path_buf());
    }
}

#[async_trait]
impl AttachmentSource for LocalAttachmentSource {
    async fn pick_image(&self) -> Result<Option<String>> {
        let Some(path) = self.staged.lock().take() else {
            debug!("Image pick cancelled: nothing selected");
            return Ok(None);
        };

        let resolved = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| AttachmentError::ImageUnavailable(format!("{}: {}", path.display(), e)))?;
        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| AttachmentError::ImageUnavailable(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(AttachmentError::ImageUnavailable(format!(
                "{} is not a file",
                resolved.display()
            )));
        }

        Ok(Some(format!("file://{}", resolved.display())))
    }

    async fn start_recording(&self) -> Result<RecordingSession> {
        let session = RecordingSession::new();
        info!("Recording {} started", session.id());
        Ok(session)
    }

    async fn stop_recording(&self, session: RecordingSession) -> Result<RecordingSummary> {
        let summary = RecordingSummary {
            id: session.id(),
            duration: session.elapsed(),
        };
        info!(
            "Recording {} stopped after {} ms",
            summary.id,
            summary.duration.as_millis()
        );
        Ok(summary)
    }
}
