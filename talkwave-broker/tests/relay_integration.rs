use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use talkwave_broker::{router, run_server, BrokerState};
use talkwave_core::{MessagePayload, WireEvent};
use talkwave_transport::{TransportClient, WsTransport};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tower::ServiceExt;

struct TestBroker {
    url: String,
    state: BrokerState,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
    _static_dir: tempfile::TempDir,
}

impl TestBroker {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind broker listener");
        let url = format!("ws://{}/ws", listener.local_addr().expect("local addr"));
        let static_dir = tempfile::tempdir().expect("static dir");
        let state = BrokerState::new();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server_state = state.clone();
        let dir = static_dir.path().to_path_buf();
        let task = tokio::spawn(async move {
            let _ = run_server(server_state, listener, dir, shutdown_rx).await;
        });

        Self {
            url,
            state,
            shutdown_tx,
            task,
            _static_dir: static_dir,
        }
    }

    async fn wait_for_clients(&self, n: usize) {
        timeout(Duration::from_secs(3), async {
            while self.state.client_count() != n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("clients registered");
    }

    fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        self.task.abort();
    }
}

async fn connect_client(url: &str) -> (WsTransport, mpsc::UnboundedReceiver<MessagePayload>) {
    let transport = WsTransport::connect(url).await.expect("connect client");
    let (tx, rx) = mpsc::unbounded_channel();
    transport.on_receive(Arc::new(move |payload: MessagePayload| {
        let _ = tx.send(payload);
    }));
    (transport, rx)
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<MessagePayload>) -> MessagePayload {
    timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("wait inbound message")
        .expect("inbound channel open")
}

async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<MessagePayload>) {
    let extra = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(extra.is_err(), "unexpected extra delivery: {:?}", extra);
}

#[tokio::test]
async fn test_two_clients_both_observe_message() {
    let broker = TestBroker::spawn().await;
    let (client_a, mut rx_a) = connect_client(&broker.url).await;
    let (_client_b, mut rx_b) = connect_client(&broker.url).await;
    broker.wait_for_clients(2).await;

    let payload = MessagePayload::new("Moi", "hi");
    client_a.send(payload.clone()).await.unwrap();

    assert_eq!(recv(&mut rx_a).await, payload);
    assert_eq!(recv(&mut rx_b).await, payload);
    assert_silent(&mut rx_a).await;
    assert_silent(&mut rx_b).await;

    broker.shutdown();
}

#[tokio::test]
async fn test_fan_out_exactly_once_to_every_client() {
    let broker = TestBroker::spawn().await;
    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(connect_client(&broker.url).await);
    }
    broker.wait_for_clients(4).await;

    let payload = MessagePayload::new("Alice", "bonjour à tous").with_origin("device-a");
    clients[2].0.send(payload.clone()).await.unwrap();

    for (_, rx) in clients.iter_mut() {
        assert_eq!(recv(rx).await, payload);
    }
    for (_, rx) in clients.iter_mut() {
        assert_silent(rx).await;
    }

    broker.shutdown();
}

#[tokio::test]
async fn test_sender_order_is_preserved() {
    let broker = TestBroker::spawn().await;
    let (client_a, _rx_a) = connect_client(&broker.url).await;
    let (_client_b, mut rx_b) = connect_client(&broker.url).await;
    broker.wait_for_clients(2).await;

    for i in 0..20 {
        client_a
            .send(MessagePayload::new("Moi", format!("msg {}", i)))
            .await
            .unwrap();
    }
    for i in 0..20 {
        assert_eq!(recv(&mut rx_b).await.content, format!("msg {}", i));
    }

    broker.shutdown();
}

#[tokio::test]
async fn test_disconnect_removes_client_from_broadcast_set() {
    let broker = TestBroker::spawn().await;
    let (client_a, mut rx_a) = connect_client(&broker.url).await;
    let (client_b, _rx_b) = connect_client(&broker.url).await;
    broker.wait_for_clients(2).await;

    client_b.close().await.unwrap();
    broker.wait_for_clients(1).await;

    client_a.send(MessagePayload::new("Moi", "still here")).await.unwrap();
    assert_eq!(recv(&mut rx_a).await.content, "still here");

    broker.shutdown();
}

#[tokio::test]
async fn test_payload_is_relayed_verbatim() {
    let broker = TestBroker::spawn().await;
    let (mut raw_a, _) = connect_async(broker.url.as_str()).await.unwrap();
    let (mut raw_b, _) = connect_async(broker.url.as_str()).await.unwrap();
    broker.wait_for_clients(2).await;

    let frame = r#"{"event":"message","data":{"sender":"Moi","content":"hi","extra":[1,2]}}"#;
    raw_a.send(WsMessage::Text(frame.to_string())).await.unwrap();
    raw_a
        .send(WsMessage::Text(r#"{"event":"typing","data":{}}"#.to_string()))
        .await
        .unwrap();

    let received = timeout(Duration::from_secs(3), raw_b.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(received, WsMessage::Text(frame.to_string()));

    let parsed = WireEvent::decode(received.to_text().unwrap()).unwrap();
    let WireEvent::Message(payload) = parsed;
    assert_eq!(payload.sender, "Moi");

    // The unknown event is not relayed
    let extra = timeout(Duration::from_millis(200), raw_b.next()).await;
    assert!(extra.is_err());

    broker.shutdown();
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>TalkWave</h1>").unwrap();

    let app = router(BrokerState::new(), static_dir.path());
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>TalkWave</h1>");

    let missing = app
        .oneshot(Request::builder().uri("/nope.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
