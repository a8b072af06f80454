use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use talkwave_core::utils::truncate;
use talkwave_core::WireEvent;

use crate::state::{BrokerState, ClientId};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<BrokerState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: BrokerState) {
    let (client_id, mut outbox) = state.register();
    tracing::info!(client = %client_id, clients = state.client_count(), "Client connected");

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                relay_frame(&state, client_id, &text);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(client = %client_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Dropping the queue sender lets the writer drain and finish
    state.unregister(client_id);
    let _ = writer.await;
    tracing::info!(client = %client_id, clients = state.client_count(), "Client disconnected");
}

/// Broadcast a `message` frame verbatim; anything else is dropped
pub fn relay_frame(state: &BrokerState, client_id: ClientId, frame: &str) -> usize {
    match WireEvent::decode(frame) {
        Ok(event) => {
            tracing::info!(
                client = %client_id,
                event = event.name(),
                "Message received: {}",
                truncate(frame, 200)
            );
            state.broadcast(frame)
        }
        Err(e) => {
            tracing::warn!(
                client = %client_id,
                "Dropping unrecognised frame: {} (raw: {})",
                e,
                truncate(frame, 100)
            );
            0
        }
    }
}
