//! Live event WebSocket endpoint
//!
//! GET /ws
//!
//! Server → client only: every simulation event as one JSON text frame.
//! Frames from the client other than Close are ignored; axum answers Pings.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use shared::LiveEvent;
use tokio::sync::broadcast;

use crate::state::AppState;

/// GET /ws
pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_ws_session(socket, state))
}

async fn live_ws_session(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // subscribe before the snapshot so nothing falls in between
    let mut hub_rx = state.hub.subscribe();
    tracing::info!(subscribers = state.hub.subscriber_count(), "Live WS connected");

    if let Some(snapshot) = state.hub.farms_snapshot()
        && send_event(&mut sink, &snapshot).await.is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            event = hub_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Live subscriber lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Live WS read error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    drop(hub_rx);
    tracing::info!(subscribers = state.hub.subscriber_count(), "Live WS disconnected");
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &LiveEvent,
) -> Result<(), axum::Error> {
    let json = match event.encode() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(event_type = event.event_type(), "Failed to encode event: {e}");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
