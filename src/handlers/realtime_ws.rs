//! Per-user realtime channel at `/api/ws`
//!
//! The socket task owns one registry connection. Events pushed through the
//! registry arrive on the connection's mpsc receiver and are forwarded as
//! text frames. Clients send `{"type": "ping"}` for a `pong`; any other
//! `type` narrows the connection to that topic.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::auth::AuthUser;
use crate::realtime::LiveEvent;
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ClientMessage {
    #[serde(rename = "type")]
    kind: String,
}

/// GET /api/ws?userId=…
pub async fn realtime_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user.id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: i32) {
    let (mut sender, mut receiver) = socket.split();

    let Some((connection_id, mut events)) = state.registry.register(user_id) else {
        let _ = send_event(
            &mut sender,
            &LiveEvent::Error {
                message: "Server is shutting down".to_string(),
            },
        )
        .await;
        return;
    };

    info!(connection_id, user_id, "Realtime connection opened");

    if send_event(&mut sender, &LiveEvent::Connected { user_id }).await.is_err() {
        state.registry.unregister(connection_id);
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(payload) => {
                        if let Err(e) = sender.send(Message::Text(payload.into())).await {
                            debug!("WebSocket send error: {}", e);
                            break;
                        }
                    }
                    None => {
                        info!(connection_id, "Registry closed, ending realtime connection");
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = sender.send(Message::Ping(axum::body::Bytes::new())).await {
                    debug!("Heartbeat failed: {}", e);
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(req) if req.kind == "ping" => {
                                if send_event(&mut sender, &LiveEvent::Pong).await.is_err() {
                                    break;
                                }
                            }
                            Ok(req) => {
                                state.registry.subscribe(connection_id, &req.kind);
                                debug!(connection_id, topic = %req.kind, "Topic subscribed");
                            }
                            Err(e) => {
                                warn!(connection_id, "Unreadable client message: {}", e);
                                let reply = LiveEvent::Error {
                                    message: "Messages must be JSON with a type field".to_string(),
                                };
                                if send_event(&mut sender, &reply).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(connection_id, "WebSocket closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.registry.unregister(connection_id);
    info!(connection_id, user_id, "Realtime connection closed");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &LiveEvent,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize live event: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
