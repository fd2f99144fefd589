//! `WebSocket` realtime channel.
//!
//! Clients connect to `GET /ws`. Each connection gets its own
//! [`broadcast::Receiver`], so every subscriber sees the same frame stream
//! through an independent queue, and a slow subscriber only ever hurts
//! itself: once it falls more than the channel capacity behind, it skips
//! ahead to the newest frame.
//!
//! Inbound text frames are decoded as [`ClientMessage`]s:
//!
//! - `NEW_LOG` payloads are validated, stored, and the stored record is
//!   broadcast to every subscriber, the sender included.
//! - Anything that fails to decode, validate, or store is answered with an
//!   `ERROR` frame to the sender only. The connection stays open.
//!
//! Frames published before a client subscribed are never replayed.
//! Viewers fetch history over HTTP first and merge pushed records by id.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use validator::Validate;

use ddos_sim_types::{ClientMessage, NewTrafficLog, ServerMessage};

use crate::state::AppState;
use crate::validation::violations_from_validator;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming realtime frames.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_realtime(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Process one inbound text frame.
///
/// Successful frames are broadcast to every subscriber and produce no
/// direct reply. Failed frames produce the `ERROR` frame that should go
/// back to the sender alone.
pub async fn process_frame(state: &AppState, text: &str) -> Option<ServerMessage> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "Rejected undecodable realtime frame");
            return Some(ServerMessage::error(format!("Invalid message format: {e}")));
        }
    };

    match message {
        ClientMessage::NewLog(payload) => submit_log(state, payload).await.err(),
    }
}

/// Validate, store, and broadcast one traffic sample.
async fn submit_log(state: &AppState, payload: NewTrafficLog) -> Result<(), ServerMessage> {
    if let Err(errors) = payload.validate() {
        let detail = violations_from_validator(&errors)
            .into_iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ServerMessage::error(format!("Invalid message format: {detail}")));
    }

    // Hold the write lock across the broadcast so frames go out in id order.
    let mut store = state.store.write().await;
    let log = store.create_traffic_log(payload).map_err(|e| {
        debug!(error = %e, "Store rejected traffic log");
        ServerMessage::error(format!("Invalid message format: {e}"))
    })?;
    let receivers = state.broadcast(ServerMessage::NewLog { data: log.clone() });
    drop(store);

    debug!(log_id = %log.id, test_id = %log.test_id, receivers, "Traffic log broadcast");
    Ok(())
}

/// Handle the `WebSocket` lifecycle: subscribe to the broadcast channel,
/// forward each frame, and process inbound frames until the client leaves.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading anything so the sender sees its own records.
    let mut rx = state.subscribe();
    info!(subscribers = state.subscriber_count(), "Realtime client connected");

    loop {
        tokio::select! {
            // Forward a published frame.
            result = rx.recv() => {
                match result {
                    Ok(frame) => {
                        if !send_frame(&mut socket, &frame).await {
                            debug!("Realtime client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "Realtime client lagged, skipping ahead");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Handle a frame from the client.
            msg = socket.recv() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(bytes))) => {
                        String::from_utf8_lossy(&bytes).into_owned()
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("Realtime client disconnected (pong failed)");
                            return;
                        }
                        continue;
                    }
                    Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Realtime client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                };

                if let Some(reply) = process_frame(&state, &text).await {
                    if !send_frame(&mut socket, &reply).await {
                        debug!("Realtime client disconnected (reply failed)");
                        return;
                    }
                }
            }
        }
    }
}

/// Serialize and send one frame. Returns `false` if the socket is gone.
async fn send_frame(socket: &mut WebSocket, frame: &ServerMessage) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(kind = frame.kind(), "Failed to serialize realtime frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
