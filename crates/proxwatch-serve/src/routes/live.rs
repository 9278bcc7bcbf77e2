//! Live push over WebSocket.
//!
//! Each connection becomes a broadcast subscriber. The server pushes the
//! two-message vocabulary (`locationUpdate`, `notification`) as JSON text
//! frames. Inbound text frames carrying a `locationUpdate` payload are
//! re-broadcast to every other subscriber, attributed to this connection
//! so the sender never echoes to itself. All other inbound frames are
//! ignored.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use proxwatch_engine::LiveMessage;

use crate::state::AppState;

/// `GET /ws`
///
/// Upgrades the connection and registers it as a live subscriber.
pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut subscription = state.service.subscribe();
    let subscriber = subscription.id();
    tracing::debug!(%subscriber, "live subscriber connected");

    loop {
        tokio::select! {
            outbound = subscription.recv() => {
                let Some(message) = outbound else {
                    // Broadcaster gone; the process is shutting down.
                    break;
                };
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(%subscriber, error = %err, "failed to encode live message");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        relay_client_frame(&state, subscriber, &text);
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // Dropping the subscription releases the channel membership.
    tracing::debug!(%subscriber, "live subscriber disconnected");
}

/// Re-broadcast a client-relayed location update to the other subscribers.
///
/// Client relays are push-only hints for live maps; they are not stored
/// and never produce notifications. Frames that do not parse as a
/// `locationUpdate` are dropped.
fn relay_client_frame(state: &AppState, subscriber: proxwatch_engine::SubscriberId, text: &str) {
    match serde_json::from_str::<LiveMessage>(text) {
        Ok(message @ LiveMessage::LocationUpdate { .. }) => {
            state.service.publish_from(subscriber, message);
        }
        Ok(LiveMessage::Notification { .. }) => {
            tracing::debug!(%subscriber, "ignoring client-sent notification frame");
        }
        Err(err) => {
            tracing::debug!(%subscriber, error = %err, "ignoring unparseable client frame");
        }
    }
}
