//! WebSocket transport
//!
//! Connects to the broker's `/ws` endpoint. Each text frame carries one
//! [`WireEvent`] envelope.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use talkwave_core::utils::truncate;
use talkwave_core::{MessagePayload, WireEvent};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::base::{ReceiveHandler, Result, TransportClient, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

/// One persistent WebSocket connection to a broker
///
/// Inbound frames are decoded on a read task and queued; a dispatch task
/// drains the queue and runs the registered handlers. Events that arrive
/// before the first handler is registered are held until one is.
pub struct WsTransport {
    endpoint: String,
    ws_tx: Arc<tokio::sync::Mutex<Option<WsSink>>>,
    connected: Arc<AtomicBool>,
    handlers: Arc<RwLock<Vec<ReceiveHandler>>>,
    handler_ready: Arc<Notify>,
    reader: Mutex<Option<JoinHandle<()>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl WsTransport {
    /// Open a connection to `endpoint` (`ws://` or `wss://`)
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint(endpoint));
        }

        info!("Connecting to broker at {}...", endpoint);
        let (ws_stream, _) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", endpoint, e)))?;
        info!("Connected to broker");

        let (write, read) = ws_stream.split();
        let ws_tx = Arc::new(tokio::sync::Mutex::new(Some(write)));
        let connected = Arc::new(AtomicBool::new(true));
        let handlers: Arc<RwLock<Vec<ReceiveHandler>>> = Arc::new(RwLock::new(Vec::new()));
        let handler_ready = Arc::new(Notify::new());
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(Self::read_loop(
            read,
            event_tx,
            connected.clone(),
            ws_tx.clone(),
        ));
        let dispatcher = tokio::spawn(Self::dispatch_loop(
            event_rx,
            handlers.clone(),
            handler_ready.clone(),
        ));

        Ok(Self {
            endpoint,
            ws_tx,
            connected,
            handlers,
            handler_ready,
            reader: Mutex::new(Some(reader)),
            dispatcher: Mutex::new(Some(dispatcher)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Decode frames until the socket ends
    async fn read_loop(
        mut read: WsSource,
        event_tx: mpsc::UnboundedSender<MessagePayload>,
        connected: Arc<AtomicBool>,
        ws_tx: Arc<tokio::sync::Mutex<Option<WsSink>>>,
    ) {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => match WireEvent::decode(&text) {
                    Ok(WireEvent::Message(payload)) => {
                        if event_tx.send(payload).is_err() {
                            debug!("Dispatcher gone, stopping read loop");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Ignoring unrecognised frame from broker: {} (raw: {})",
                            e,
                            truncate(&text, 100)
                        );
                    }
                },
                Ok(WsMessage::Close(_)) => {
                    info!("WebSocket closed by broker");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
            }
        }

        connected.store(false, Ordering::SeqCst);
        ws_tx.lock().await.take();
        debug!("Broker read loop ended");
    }

    /// Run handlers for each queued payload, in arrival order
    async fn dispatch_loop(
        mut event_rx: mpsc::UnboundedReceiver<MessagePayload>,
        handlers: Arc<RwLock<Vec<ReceiveHandler>>>,
        handler_ready: Arc<Notify>,
    ) {
        while let Some(payload) = event_rx.recv().await {
            loop {
                let ready = !handlers.read().is_empty();
                if ready {
                    break;
                }
                handler_ready.notified().await;
            }

            let current: Vec<ReceiveHandler> = handlers.read().clone();
            for handler in current {
                handler(payload.clone());
            }
        }
        debug!("Broker dispatch loop ended");
    }

    fn abort_tasks(&self) {
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.dispatcher.lock().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl TransportClient for WsTransport {
    async fn send(&self, payload: MessagePayload) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }

        let frame = WireEvent::from(payload)
            .encode()
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let mut tx = self.ws_tx.lock().await;
        match tx.as_mut() {
            Some(write) => write
                .send(WsMessage::Text(frame))
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string())),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    fn on_receive(&self, handler: ReceiveHandler) {
        self.handlers.write().push(handler);
        self.handler_ready.notify_one();
    }

    async fn close(&self) -> Result<()> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            self.abort_tasks();
            return Ok(());
        }

        info!("Closing broker connection");
        if let Some(mut write) = self.ws_tx.lock().await.take() {
            if let Err(e) = write.close().await {
                debug!("Error while closing WebSocket: {}", e);
            }
        }
        self.abort_tasks();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
