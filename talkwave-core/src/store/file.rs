//! JSON file backed snapshot store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{MessageStore, Result, StoreError, SNAPSHOT_KEY};
use crate::message::Message;
use crate::utils::safe_filename;

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileMessageStore {
    dir: PathBuf,
    key: String,
}

impl FileMessageStore {
    /// Create a store for the default snapshot key
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_key(dir, SNAPSHOT_KEY)
    }

    /// Create a store for a custom key
    pub fn with_key<P: AsRef<Path>>(dir: P, key: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", safe_filename(&self.key)))
    }
}

#[async_trait]
impl MessageStore for FileMessageStore {
    async fn load(&self) -> Result<Vec<Message>> {
        let path = self.path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Read(format!("{}: {}", path.display(), e))),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    async fn save(&self, messages: &[Message]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {}", self.dir.display(), e)))?;

        let payload =
            serde_json::to_vec(messages).map_err(|e| StoreError::Write(e.to_string()))?;

        // Write then rename so a reader never sees a partial document
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {}", path.display(), e)))?;

        debug!("Saved {} messages to {}", messages.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Content, Sender};
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn sample() -> Vec<Message> {
        vec![
            Message::new(1, Sender::LocalUser, Content::text("hi")).with_author("Moi"),
            Message::new(2, Sender::AutomatedAgent, Content::text("Bonjour !")),
            Message::new(3, Sender::LocalUser, Content::Image("file:///tmp/a.png".into())),
            Message::new(4, Sender::RemoteUser, Content::Empty).with_author("Toi"),
        ]
    }

    #[tokio::test]
    async fn test_load_missing_snapshot_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileMessageStore::new(temp_dir.path());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileMessageStore::new(temp_dir.path());

        let messages = sample();
        assert_ok!(store.save(&messages).await);
        assert_eq!(store.load().await.unwrap(), messages);
        assert!(store.path().ends_with("chatMessages.json"));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileMessageStore::new(temp_dir.path());

        store.save(&sample()).await.unwrap();
        let shorter = vec![Message::new(9, Sender::LocalUser, Content::text("only"))];
        store.save(&shorter).await.unwrap();

        assert_eq!(store.load().await.unwrap(), shorter);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileMessageStore::new(temp_dir.path());
        std::fs::write(store.path(), "[{\"id\":").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_save_into_unwritable_location_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let store = FileMessageStore::new(blocker.join("data"));
        let err = store.save(&sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
    }
}
