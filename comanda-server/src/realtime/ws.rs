//! Realtime channel endpoint
//!
//! `GET /ws` upgrades and forwards every lifecycle event as one JSON text
//! frame. There is no backfill: a client fetches current state over the
//! HTTP API after connecting.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| client_loop(socket, state))
}

async fn client_loop(socket: WebSocket, state: ServerState) {
    let mut events = state.broadcaster.subscribe();
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(
        subscribers = state.broadcaster.receiver_count(),
        "Realtime subscriber connected"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let frame = event.frame().to_string();
                        if sender.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Best-effort channel: drop and keep going.
                        tracing::warn!(missed, "Realtime subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Subscribers only listen; other inbound frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("Realtime subscriber disconnected");
}
