//! The chat session orchestrator

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use talkwave_core::attachment::{AttachmentSource, RecordingSession, RecordingSummary};
use talkwave_core::responses::ResponseEngine;
use talkwave_core::store::MessageStore;
use talkwave_core::{Content, Message, MessagePayload, Sender};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::log::ChatLog;
use crate::mode::{SessionMode, SessionSettings};

/// Capacity of the re-render notification channel
const UPDATE_CAPACITY: usize = 256;

/// What the user is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A non-blank draft is pending
    Composing,
    /// An audio capture is running
    Recording,
}

/// Broker reachability as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Auto-reply mode has no transport
    Offline,
    Connected,
    Disconnected,
}

/// Outcome of a recording toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingStatus {
    Started,
    Stopped(RecordingSummary),
    /// The recorder failed; no capture is active afterwards
    Failed,
}

/// Messages appended by one submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub message: Message,
    /// Automated answer, in auto-reply mode only
    pub reply: Option<Message>,
}

struct Inner {
    settings: SessionSettings,
    mode: SessionMode,
    store: Arc<dyn MessageStore>,
    attachments: Arc<dyn AttachmentSource>,
    log: tokio::sync::Mutex<ChatLog>,
    draft: Mutex<String>,
    recording: tokio::sync::Mutex<Option<RecordingSession>>,
    updates: broadcast::Sender<Message>,
}

/// Single writer of one conversation
///
/// Every append goes through the log lock, which also covers the snapshot
/// save, so snapshots are written in append order. Persistence, transport
/// and attachment failures are logged and contained here: the caller never
/// sees them and the session keeps working in memory.
pub struct ChatSession {
    inner: Arc<Inner>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ChatSession {
    /// Load the stored conversation and wire up the chosen mode
    pub async fn open(
        settings: SessionSettings,
        mode: SessionMode,
        store: Arc<dyn MessageStore>,
        attachments: Arc<dyn AttachmentSource>,
    ) -> Self {
        let stored = match store.load().await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Failed to load chat snapshot, starting empty: {}", e);
                Vec::new()
            }
        };
        info!(
            "Chat session opened in {} mode with {} stored messages",
            mode.name(),
            stored.len()
        );

        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let inner = Arc::new(Inner {
            settings,
            mode,
            store,
            attachments,
            log: tokio::sync::Mutex::new(ChatLog::from_snapshot(stored)),
            draft: Mutex::new(String::new()),
            recording: tokio::sync::Mutex::new(None),
            updates,
        });

        let pump = match &inner.mode {
            SessionMode::Relay(transport) => {
                let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
                transport.on_receive(Arc::new(move |payload: MessagePayload| {
                    let _ = inbound_tx.send(payload);
                }));
                Some(tokio::spawn(Self::inbound_pump(
                    Arc::downgrade(&inner),
                    inbound_rx,
                )))
            }
            SessionMode::AutoReply(_) => None,
        };

        Self {
            inner,
            pump: Mutex::new(pump),
        }
    }

    /// Apply inbound events one at a time, in delivery order
    async fn inbound_pump(inner: Weak<Inner>, mut inbound_rx: mpsc::UnboundedReceiver<MessagePayload>) {
        while let Some(payload) = inbound_rx.recv().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            inner.receive(payload).await;
        }
        debug!("Inbound pump stopped");
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    pub fn mode(&self) -> &SessionMode {
        &self.inner.mode
    }

    /// Replace the draft (`Idle -> Composing`)
    pub fn set_draft(&self, text: impl Into<String>) {
        *self.inner.draft.lock() = text.into();
    }

    pub fn draft(&self) -> String {
        self.inner.draft.lock().clone()
    }

    /// Send the current draft (`Composing -> Sent`)
    ///
    /// A blank draft is left untouched and nothing is sent.
    pub async fn submit(&self) -> Option<Submission> {
        let text = {
            let mut draft = self.inner.draft.lock();
            if draft.trim().is_empty() {
                return None;
            }
            std::mem::take(&mut *draft)
        };
        self.inner.dispatch_text(text).await
    }

    /// Send `text` without touching the draft
    pub async fn send_text(&self, text: impl Into<String>) -> Option<Submission> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        self.inner.dispatch_text(text).await
    }

    /// Ask the attachment source for an image and append it
    ///
    /// Returns `None` when the user cancels or the picker fails.
    pub async fn attach_image(&self) -> Option<Message> {
        self.inner.stop_active_recording().await;

        let reference = match self.inner.attachments.pick_image().await {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                debug!("Image pick cancelled");
                return None;
            }
            Err(e) => {
                warn!("Image pick failed: {}", e);
                return None;
            }
        };

        let mut log = self.inner.log.lock().await;
        let message = self.inner.append(
            &mut log,
            Sender::LocalUser,
            Some(self.inner.settings.display_name.clone()),
            Content::Image(reference),
        );
        self.inner.persist(&log).await;
        Some(message)
    }

    /// Start a capture, or stop the running one
    pub async fn toggle_recording(&self) -> RecordingStatus {
        let mut recording = self.inner.recording.lock().await;
        match recording.take() {
            Some(session) => match self.inner.attachments.stop_recording(session).await {
                Ok(summary) => RecordingStatus::Stopped(summary),
                Err(e) => {
                    warn!("Failed to stop recording: {}", e);
                    RecordingStatus::Failed
                }
            },
            None => match self.inner.attachments.start_recording().await {
                Ok(session) => {
                    *recording = Some(session);
                    RecordingStatus::Started
                }
                Err(e) => {
                    warn!("Failed to start recording: {}", e);
                    RecordingStatus::Failed
                }
            },
        }
    }

    pub async fn is_recording(&self) -> bool {
        self.inner.recording.lock().await.is_some()
    }

    /// Apply one inbound broker event
    ///
    /// Returns the appended message, or `None` for the echo of a message
    /// this session already appended when it was submitted.
    pub async fn receive(&self, payload: MessagePayload) -> Option<Message> {
        self.inner.receive(payload).await
    }

    /// Copy of the conversation in order
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.log.lock().await.messages().to_vec()
    }

    pub async fn state(&self) -> SessionState {
        if self.is_recording().await {
            SessionState::Recording
        } else if self.inner.draft.lock().trim().is_empty() {
            SessionState::Idle
        } else {
            SessionState::Composing
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        match &self.inner.mode {
            SessionMode::Relay(transport) if transport.is_connected() => Connectivity::Connected,
            SessionMode::Relay(_) => Connectivity::Disconnected,
            SessionMode::AutoReply(_) => Connectivity::Offline,
        }
    }

    /// Receive every appended message, local or inbound
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.inner.updates.subscribe()
    }

    /// Stop any capture, close the transport and stop inbound processing
    pub async fn close(&self) {
        self.inner.stop_active_recording().await;
        if let SessionMode::Relay(transport) = &self.inner.mode {
            if let Err(e) = transport.close().await {
                warn!("Failed to close transport: {}", e);
            }
        }
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
        info!("Chat session closed");
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
    }
}

impl Inner {
    async fn dispatch_text(&self, text: String) -> Option<Submission> {
        // Any outbound action ends a running capture first
        self.stop_active_recording().await;

        let author = Some(self.settings.display_name.clone());
        match &self.mode {
            SessionMode::Relay(transport) => {
                let message = {
                    let mut log = self.log.lock().await;
                    let message =
                        self.append(&mut log, Sender::LocalUser, author, Content::text(text.clone()));
                    self.persist(&log).await;
                    message
                };

                let payload = MessagePayload::new(self.settings.display_name.clone(), text)
                    .with_origin(self.settings.device_id.clone());
                if let Err(e) = transport.send(payload).await {
                    warn!("Failed to relay message {}: {}", message.id, e);
                }

                Some(Submission {
                    message,
                    reply: None,
                })
            }
            SessionMode::AutoReply(catalog) => {
                let mut log = self.log.lock().await;
                let message = self.append(&mut log, Sender::LocalUser, author, Content::text(text));
                let reply = match ResponseEngine::generate(catalog) {
                    Ok(body) => Some(self.append(
                        &mut log,
                        Sender::AutomatedAgent,
                        None,
                        Content::text(body),
                    )),
                    Err(e) => {
                        warn!("No automated reply for message {}: {}", message.id, e);
                        None
                    }
                };
                self.persist(&log).await;

                Some(Submission { message, reply })
            }
        }
    }

    async fn receive(&self, payload: MessagePayload) -> Option<Message> {
        if payload.origin.as_deref() == Some(self.settings.device_id.as_str()) {
            debug!("Skipping echo of own message");
            return None;
        }

        let mut log = self.log.lock().await;
        let message = self.append(
            &mut log,
            Sender::RemoteUser,
            Some(payload.sender),
            Content::text(payload.content),
        );
        self.persist(&log).await;
        Some(message)
    }

    fn append(
        &self,
        log: &mut ChatLog,
        sender: Sender,
        author: Option<String>,
        content: Content,
    ) -> Message {
        let message = log.append(sender, author, content);
        debug!("Appended message {} from {}", message.id, sender.as_str());
        let _ = self.updates.send(message.clone());
        message
    }

    /// Save the whole log; a failure leaves the session memory-only
    async fn persist(&self, log: &ChatLog) {
        if let Err(e) = self.store.save(log.messages()).await {
            warn!("Failed to save chat snapshot, continuing in memory: {}", e);
        }
    }

    async fn stop_active_recording(&self) {
        let mut recording = self.recording.lock().await;
        if let Some(session) = recording.take() {
            debug!("Stopping recording {} before outbound action", session.id());
            if let Err(e) = self.attachments.stop_recording(session).await {
                warn!("Failed to stop recording: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkwave_core::attachment::LocalAttachmentSource;
    use talkwave_core::responses::ResponseCatalog;
    use talkwave_core::store::MemoryMessageStore;
    use talkwave_transport::LoopbackTransport;

    async fn relay_session(transport: Arc<LoopbackTransport>) -> ChatSession {
        ChatSession::open(
            SessionSettings::new("Moi").with_device_id("dev-1"),
            SessionMode::Relay(transport),
            Arc::new(MemoryMessageStore::new()),
            Arc::new(LocalAttachmentSource::new()),
        )
        .await
    }

    #[tokio::test]
    async fn test_draft_state_transitions() {
        let session = relay_session(Arc::new(LoopbackTransport::new())).await;
        assert_eq!(session.state().await, SessionState::Idle);

        session.set_draft("hel");
        assert_eq!(session.state().await, SessionState::Composing);

        let submission = session.submit().await.unwrap();
        assert_eq!(submission.message.content, Content::text("hel"));
        assert_eq!(session.draft(), "");
        assert_eq!(session.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_draft_is_not_sent() {
        let transport = Arc::new(LoopbackTransport::new());
        let session = relay_session(transport.clone()).await;

        session.set_draft("   ");
        assert!(session.submit().await.is_none());
        assert!(session.send_text("\n").await.is_none());
        assert!(session.messages().await.is_empty());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_relay_payload_carries_name_and_origin() {
        let transport = Arc::new(LoopbackTransport::new());
        let session = relay_session(transport.clone()).await;

        session.send_text("hi").await.unwrap();
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sender, "Moi");
        assert_eq!(sent[0].content, "hi");
        assert_eq!(sent[0].origin.as_deref(), Some("dev-1"));
    }

    #[tokio::test]
    async fn test_foreign_payload_is_appended_as_remote() {
        let session = relay_session(Arc::new(LoopbackTransport::new())).await;

        let msg = session
            .receive(MessagePayload::new("Moi", "hello").with_origin("dev-2"))
            .await
            .unwrap();
        assert_eq!(msg.sender, Sender::RemoteUser);
        assert_eq!(msg.author.as_deref(), Some("Moi"));

        // No origin at all: also foreign
        assert!(session.receive(MessagePayload::new("Bob", "yo")).await.is_some());
        assert_eq!(session.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_connectivity_follows_transport() {
        let transport = Arc::new(LoopbackTransport::new());
        let session = relay_session(transport.clone()).await;
        assert_eq!(session.connectivity(), Connectivity::Connected);

        session.close().await;
        assert_eq!(session.connectivity(), Connectivity::Disconnected);

        let offline = ChatSession::open(
            SessionSettings::new("Moi"),
            SessionMode::AutoReply(Arc::new(ResponseCatalog::builtin())),
            Arc::new(MemoryMessageStore::new()),
            Arc::new(LocalAttachmentSource::new()),
        )
        .await;
        assert_eq!(offline.connectivity(), Connectivity::Offline);
    }

    #[tokio::test]
    async fn test_subscribe_sees_appends() {
        let session = relay_session(Arc::new(LoopbackTransport::new())).await;
        let mut updates = session.subscribe();

        session.send_text("one").await;
        session.receive(MessagePayload::new("Bob", "two")).await;

        assert_eq!(updates.recv().await.unwrap().content, Content::text("one"));
        assert_eq!(updates.recv().await.unwrap().content, Content::text("two"));
    }
}
