//! Change Feed WebSocket
//!
//! Streams the cache's current contents followed by every live change to a
//! connected client. The socket is push-only; inbound frames are read only
//! to notice the client going away.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tracing::{debug, info, warn};

use super::AppState;
use crate::feed::{ChangeEvent, Subscription};

/// Handler for GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_changes(socket, state))
}

/// Drives one subscriber connection until either side hangs up.
///
/// The subscriber is registered before the snapshot is read, so a write
/// landing in between shows up in the live stream (possibly twice) rather
/// than being lost.
async fn stream_changes(mut socket: WebSocket, state: AppState) {
    let Subscription { id, mut receiver } = state.feed.subscribe();
    info!(subscriber = %id, "Subscriber connected");

    if let Err(err) = replay_snapshot(&mut socket, &state).await {
        warn!(subscriber = %id, error = %err, "Failed to send snapshot");
        state.feed.unsubscribe(id);
        return;
    }

    loop {
        tokio::select! {
            event = receiver.recv() => {
                let Some(event) = event else {
                    // Registry dropped us after a buffer overflow
                    warn!(subscriber = %id, "Subscriber fell behind, closing");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                if let Err(err) = send_event(&mut socket, &event).await {
                    debug!(subscriber = %id, error = %err, "Send failed");
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!(subscriber = %id, error = %err, "Receive failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.feed.unsubscribe(id);
    info!(subscriber = %id, "Subscriber disconnected");
}

/// Sends every live entry as a `set` event.
async fn replay_snapshot(socket: &mut WebSocket, state: &AppState) -> Result<(), axum::Error> {
    let snapshot = state.snapshot().await;

    for (key, item) in snapshot {
        send_event(socket, &ChangeEvent::set(key, item.value, item.expires_at)).await?;
    }
    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: &ChangeEvent) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).map_err(axum::Error::new)?;
    socket.send(Message::Text(text)).await
}
