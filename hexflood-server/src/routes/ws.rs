//! Websocket endpoint running the relay protocol

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::ServerState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Pump frames both ways until either side closes
async fn handle_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn = state.relay.connect(tx);

    loop {
        tokio::select! {
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => state.relay.handle(conn, msg),
                        Err(e) => state
                            .relay
                            .send(conn, ServerMessage::error(format!("malformed message: {}", e))),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("Connection {} read error: {}", conn, e);
                    break;
                }
            },
            outbound = rx.recv() => match outbound {
                Some(msg) => {
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("Could not encode message for {}: {}", conn, e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    state.relay.disconnect(conn);
}
