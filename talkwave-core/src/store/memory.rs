//! In-memory snapshot store

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{MessageStore, Result, StoreError};
use crate::message::Message;

/// Keeps the snapshot in process memory
///
/// Failure injection lets callers exercise the degrade-to-memory path.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    snapshot: Mutex<Option<Vec<Message>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let store = Self::default();
        *store.snapshot.lock() = Some(messages);
        store
    }

    /// Make subsequent loads fail
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current snapshot, if one was ever saved
    pub fn snapshot(&self) -> Option<Vec<Message>> {
        self.snapshot.lock().clone()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn load(&self) -> Result<Vec<Message>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("injected load failure".to_string()));
        }
        Ok(self.snapshot.lock().clone().unwrap_or_default())
    }

    async fn save(&self, messages: &[Message]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Write("injected save failure".to_string()));
        }
        *self.snapshot.lock() = Some(messages.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
