use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;

use crate::app::SharedState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the snapshot so no mutation falls in between.
    let mut rx = state.subscribe_ws();

    // Send connection confirmation
    let client_id = uuid::Uuid::new_v4().to_string();
    let welcome = serde_json::json!({
        "type": "connected",
        "data": { "clientId": client_id }
    });
    let snapshot = state.toast_snapshot();
    for msg in [welcome, snapshot] {
        if sender
            .send(Message::Text(msg.to_string().into()))
            .await
            .is_err()
        {
            return;
        }
    }

    tracing::info!("WebSocket client connected: {}", client_id);

    // Forward broadcast messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from this client and handle routing
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_message(&text, &state);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::info!("WebSocket client disconnected: {}", cid);
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Route incoming client messages.
fn handle_client_message(text: &str, state: &SharedState) {
    let Ok(msg) = serde_json::from_str::<Value>(text) else {
        tracing::debug!("Ignoring non-JSON client message");
        return;
    };

    match msg.get("type").and_then(|t| t.as_str()).unwrap_or("") {
        // Ping/pong handled at application level
        "ping" => {
            let pong = serde_json::json!({ "type": "pong" });
            let _ = state.ws_sender().send(pong.to_string());
        }
        // Close control clicked on an overlay
        "toast_dismiss" => match msg.pointer("/data/id").and_then(|id| id.as_str()) {
            Some(id) => {
                if !state.dismiss_toast(id) {
                    tracing::debug!(id, "Dismiss for unknown toast");
                }
            }
            None => tracing::debug!("toast_dismiss without id"),
        },
        other => tracing::debug!(kind = other, "Ignoring client message"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toasty_core::{RegistryConfig, RegistrySlot, SendOptions, ToastState};

    use super::*;
    use crate::config::AppConfig;

    fn state() -> SharedState {
        let config = AppConfig {
            fade_ms: 10_000,
            toasts: RegistryConfig::new().autohide(false),
            ..AppConfig::default()
        };
        SharedState::new(config, &RegistrySlot::new())
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let state = state();
        let mut rx = state.subscribe_ws();

        handle_client_message(r#"{"type":"ping"}"#, &state);

        let reply: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(reply["type"], "pong");
    }

    #[tokio::test]
    async fn dismiss_starts_hiding_the_toast() {
        let state = state();
        let id = state.with_toasts(|registry| {
            registry.send(SendOptions::new("A", "B").with_id("ws1"))
        });

        let msg = json!({ "type": "toast_dismiss", "data": { "id": id } });
        handle_client_message(&msg.to_string(), &state);

        let toast_state = state.with_toasts(|registry| registry.state_of("ws1"));
        assert_eq!(toast_state, Some(ToastState::Hiding));
    }

    #[tokio::test]
    async fn malformed_messages_are_ignored() {
        let state = state();
        state.with_toasts(|registry| registry.send(SendOptions::new("A", "B").with_id("ws2")));

        handle_client_message("not json", &state);
        handle_client_message(r#"{"type":"toast_dismiss"}"#, &state);
        handle_client_message(r#"{"type":"toast_dismiss","data":{"id":"ghost"}}"#, &state);

        let toast_state = state.with_toasts(|registry| registry.state_of("ws2"));
        assert_eq!(toast_state, Some(ToastState::Visible));
    }
}
