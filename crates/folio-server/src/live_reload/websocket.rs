//! WebSocket handler for live reload.
//!
//! Sends the current book first, then forwards every update to the client.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;

use super::event::UpdateEvent;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn send(socket: &mut WebSocket, event: &UpdateEvent) -> bool {
    let msg = match serde_json::to_string(event) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize update");
            return true;
        }
    };
    socket.send(Message::Text(msg.into())).await.is_ok()
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(ref live_reload) = state.live_reload else {
        return;
    };

    // Subscribe before the first send so no update is lost in between
    let mut receiver = live_reload.subscribe();
    tracing::debug!(state = ?live_reload.state(), "Live reload client connected");

    if !send(&mut socket, &UpdateEvent::model(&state.store.config())).await {
        return;
    }

    loop {
        tokio::select! {
            result = receiver.recv() => {
                match result {
                    Ok(event) => {
                        if !send(&mut socket, &event).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Live reload client lagging, updates skipped");
                    }
                }
            }
            // Client messages only keep the connection alive
            result = socket.recv() => {
                match result {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }
}
