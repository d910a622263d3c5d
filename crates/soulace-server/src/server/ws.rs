//! WebSocket relay endpoint.
//!
//! One reader loop per socket decodes inbound frames and hands them to the
//! relay; a writer task drains the connection's outbound channel.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use soulace_core::ClientEvent;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `GET /ws?userId=<id>`
///
/// The identity is taken as given; callers are trusted to present their own.
pub async fn upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let identity = params
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".into()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: String) {
    let (conn, mut rx) = state.relay.connect(&identity).await;
    let handle = conn.handle.clone();
    drop(conn);
    mark_online(&state, &identity).await;
    info!(identity = %identity, handle = %handle, "Client connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ClientEvent::decode(text.as_str()) {
                        Ok(event) => {
                            if let Err(e) = state.relay.dispatch(&identity, event).await {
                                e.log(&identity);
                            }
                        }
                        Err(e) => {
                            warn!(identity = %identity, error = %e, "Malformed frame dropped");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(identity = %identity, error = %e, "Socket read failed");
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    send_task.abort();

    if let Some(offline) = state.relay.disconnect(&handle).await {
        mark_offline(&state, &offline).await;
    }
    info!(identity = %identity, handle = %handle, "Client disconnected");
}

/// Persist the online flag. Must run after the relay registration.
async fn mark_online(state: &AppState, identity: &str) {
    if let Err(e) = state.db.set_online(identity, true).await {
        warn!(identity = %identity, error = %e, "Failed to mark online");
    }
}

/// Persist the offline flag, then undo it if a newer connection registered
/// the identity while the write was in flight.
async fn mark_offline(state: &AppState, identity: &str) {
    if let Err(e) = state.db.set_online(identity, false).await {
        warn!(identity = %identity, error = %e, "Failed to mark offline");
        return;
    }
    if state.relay.is_online(identity).await {
        debug!(identity = %identity, "Reconnected during disconnect, restoring online flag");
        mark_online(state, identity).await;
    }
}
