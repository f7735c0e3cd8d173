use std::sync::Arc;
use std::time::Duration;

use aquawatch_events::{Broadcaster, Outbound};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is subscribed to the broadcaster and
/// served by a sender task plus the receive loop below.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcaster = Arc::clone(state.broadcaster());
    let send_timeout = Duration::from_secs(state.config.ws_send_timeout_secs);
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, send_timeout))
}

fn to_message(outbound: Outbound) -> Message {
    match outbound {
        Outbound::Event(payload) => Message::Text(payload.to_string().into()),
        Outbound::Ping => Message::Ping(Bytes::new()),
        Outbound::Close => Message::Close(None),
    }
}

/// Manage a single WebSocket connection after upgrade.
///
/// The sender task forwards queued messages to the sink, giving each write
/// at most `send_timeout`. The connection ends when the client closes, the
/// sender task stops (write failure, timeout, or the broadcaster dropped
/// this subscriber), or a receive error occurs.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>, send_timeout: Duration) {
    let (subscriber_id, mut rx) = broadcaster.subscribe().await.into_parts();
    tracing::info!(subscriber_id = %subscriber_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let closing = outbound == Outbound::Close;
            match tokio::time::timeout(send_timeout, sink.send(to_message(outbound))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(subscriber_id = %subscriber_id, error = %e, "WebSocket sink closed");
                    break;
                }
                Err(_) => {
                    tracing::warn!(
                        subscriber_id = %subscriber_id,
                        timeout_secs = send_timeout.as_secs(),
                        "WebSocket send timed out, dropping subscriber"
                    );
                    break;
                }
            }
            if closing {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut send_task => break,
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(subscriber_id = %subscriber_id, "Pong received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(subscriber_id = %subscriber_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
        }
    }

    broadcaster.unsubscribe(subscriber_id).await;
    send_task.abort();
    tracing::info!(subscriber_id = %subscriber_id, "WebSocket disconnected");
}
