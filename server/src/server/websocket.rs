use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};

use crate::app::SharedState;
use crate::events;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before taking the snapshot so no frame falls in between.
    let mut rx = state.subscribe_ws();

    let client_id = uuid::Uuid::new_v4().to_string();
    let welcome = events::frame(events::CONNECTED, json!({ "clientId": client_id }));
    let snapshot = events::frame(events::SNAPSHOT, state.snapshot());
    for frame in [welcome, snapshot] {
        if sender.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    tracing::info!("WebSocket client connected: {client_id}");

    // Replies meant for this client only.
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(16);

    let snapshot_state = state.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                msg = rx.recv() => match msg {
                    Ok(frame) => frame,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WebSocket client lagged, resending snapshot");
                        events::frame(events::SNAPSHOT, snapshot_state.snapshot())
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                Some(reply) = reply_rx.recv() => reply,
            };
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Some(reply) = handle_client_message(&text) {
                        if reply_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::info!("WebSocket client disconnected: {cid}");
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Answer a message from the browser. Only `ping` gets a reply.
fn handle_client_message(text: &str) -> Option<String> {
    let msg: Value = serde_json::from_str(text).ok()?;
    match msg.get("type").and_then(Value::as_str) {
        Some("ping") => Some(events::frame(events::PONG, Value::Null)),
        other => {
            tracing::debug!(kind = ?other, "Ignoring WebSocket message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_gets_pong() {
        let reply = handle_client_message(r#"{"type":"ping"}"#).unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["type"], "pong");
    }

    #[test]
    fn other_messages_are_not_echoed() {
        assert!(handle_client_message(r#"{"type":"shell_line"}"#).is_none());
        assert!(handle_client_message("not json").is_none());
    }
}
