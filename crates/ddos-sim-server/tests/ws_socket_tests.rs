//! End-to-end tests for the `/ws` socket loop.
//!
//! The router is served on an ephemeral local port and driven by real
//! `WebSocket` clients, so upgrade, forwarding, and error replies are
//! exercised exactly as a browser would see them.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ddos_sim_server::router::build_router;
use ddos_sim_server::state::AppState;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

/// Next JSON text frame, failing the test if none arrives promptly.
async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

fn log_frame(packets_sent: u64) -> Message {
    Message::text(
        json!({
            "type": "NEW_LOG",
            "payload": {
                "testId": 1,
                "packetsSent": packets_sent,
                "packetsReceived": 10,
                "responseTime": 15,
                "sourceIp": "192.168.0.9",
                "destinationIp": "10.0.0.1"
            }
        })
        .to_string(),
    )
}

/// Wait until `count` sockets have subscribed to the broadcast channel.
async fn wait_for_subscribers(state: &AppState, count: usize) {
    for _ in 0..200 {
        if state.subscriber_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(state.subscriber_count() >= count, "subscribers never arrived");
}

#[tokio::test]
async fn sender_receives_its_own_record() {
    let state = Arc::new(AppState::new());
    let addr = serve(Arc::clone(&state)).await;
    let mut producer = connect(addr).await;

    producer.send(log_frame(42)).await.unwrap();

    let frame = next_json(&mut producer).await;
    assert_eq!(frame["type"], "NEW_LOG");
    assert_eq!(frame["data"]["id"], 1);
    assert_eq!(frame["data"]["packetsSent"], 42);
}

#[tokio::test]
async fn viewers_receive_records_from_a_producer() {
    let state = Arc::new(AppState::new());
    let addr = serve(Arc::clone(&state)).await;
    let mut viewer = connect(addr).await;
    let mut producer = connect(addr).await;
    wait_for_subscribers(&state, 2).await;

    producer.send(log_frame(7)).await.unwrap();

    let seen = next_json(&mut viewer).await;
    assert_eq!(seen["type"], "NEW_LOG");
    assert_eq!(seen["data"]["packetsSent"], 7);
    let echoed = next_json(&mut producer).await;
    assert_eq!(echoed["data"]["id"], seen["data"]["id"]);
}

#[tokio::test]
async fn connection_survives_an_error_reply() {
    let state = Arc::new(AppState::new());
    let addr = serve(Arc::clone(&state)).await;
    let mut producer = connect(addr).await;

    producer.send(Message::text("{\"type\":\"NEW_LOG\"}")).await.unwrap();
    let error = next_json(&mut producer).await;
    assert_eq!(error["type"], "ERROR");
    assert!(error["message"].as_str().unwrap().starts_with("Invalid message format"));

    producer.send(log_frame(3)).await.unwrap();
    let frame = next_json(&mut producer).await;
    assert_eq!(frame["type"], "NEW_LOG");
    assert_eq!(frame["data"]["id"], 1);
    assert_eq!(state.store.read().await.counts().traffic_logs, 1);
}

#[tokio::test]
async fn error_reply_is_not_broadcast() {
    let state = Arc::new(AppState::new());
    let addr = serve(Arc::clone(&state)).await;
    let mut viewer = connect(addr).await;
    let mut producer = connect(addr).await;
    wait_for_subscribers(&state, 2).await;

    producer.send(Message::text("garbage")).await.unwrap();
    assert_eq!(next_json(&mut producer).await["type"], "ERROR");

    // The viewer's first frame is the later valid record, not the error.
    producer.send(log_frame(5)).await.unwrap();
    let seen = next_json(&mut viewer).await;
    assert_eq!(seen["type"], "NEW_LOG");
    assert_eq!(seen["data"]["packetsSent"], 5);
}
