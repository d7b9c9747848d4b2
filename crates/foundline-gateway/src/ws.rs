// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel.
//!
//! Client -> Server (JSON), first frame only:
//! ```json
//! {"type": "join", "user_id": "u-123"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "connected", "user_id": "u-123"}
//! {"type": "notification", "id": "...", "sender_id": null, "title": "...", "created_at": "..."}
//! ```
//!
//! The channel is push-only after the handshake; the client keeps it open to
//! receive live notification events and sends nothing further.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use foundline_core::PushEvent;

use crate::auth::identity_from_headers;
use crate::server::GatewayState;

/// First client frame on a new connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsHandshake {
    Join { user_id: String },
}

/// WebSocket upgrade handler.
///
/// Identity headers are validated at upgrade time; the `join` handshake must
/// then name the same user, which keeps a proxied client from registering as
/// someone else.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    headers: axum::http::HeaderMap,
) -> Result<Response, axum::http::StatusCode> {
    let Some(identity) = identity_from_headers(&headers) else {
        return Err(axum::http::StatusCode::UNAUTHORIZED);
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity.user_id)))
}

async fn handle_socket(socket: WebSocket, state: GatewayState, user_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Wait for the join frame before registering.
    let joined = loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<WsHandshake>(&text) {
                    Ok(WsHandshake::Join { user_id: claimed }) if claimed == user_id => {
                        break true;
                    }
                    Ok(WsHandshake::Join { user_id: claimed }) => {
                        tracing::warn!(
                            user_id,
                            claimed,
                            "join handshake for a different user, closing"
                        );
                        break false;
                    }
                    Err(e) => {
                        tracing::debug!("invalid handshake frame: {e}");
                        break false;
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => break false,
            Some(Ok(_)) => continue, // ping/pong before join
            Some(Err(_)) => break false,
        }
    };
    if !joined {
        return;
    }

    let (connection_id, mut rx) = state.presence.register(&user_id);

    let ack = PushEvent::Connected {
        user_id: user_id.clone(),
    };
    if let Ok(payload) = serde_json::to_string(&ack) {
        if ws_sender.send(Message::Text(payload.into())).await.is_err() {
            state.presence.unregister(&user_id, &connection_id);
            return;
        }
    }

    // Forward pushed events until either side goes away.
    let sender_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain the receive side so close frames are observed promptly.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        if matches!(msg, Message::Close(_)) {
            break;
        }
    }

    state.presence.unregister(&user_id, &connection_id);
    sender_task.abort();
}
