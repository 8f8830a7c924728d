//! WebSocket transport for the broadcast hub.
//!
//! Each connection is one subscriber: a sender task drains the subscriber's
//! queue into the socket while this task reads (and logs) inbound frames.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{
        WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

use postboard_events::BroadcastHub;

use crate::app::services::AppServices;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    let hub = services.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let (id, mut outbound) = hub.subscribe().into_parts();
    let (mut sender, mut receiver) = socket.split();

    // Ends when the socket breaks or the hub drops us (evicted).
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    tracing::info!(subscriber_id = %id, message = %text, "inbound real-time message");
                }
                Ok(Message::Binary(data)) => {
                    tracing::debug!(subscriber_id = %id, bytes = data.len(), "inbound binary message");
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Err(e) => {
                    tracing::warn!(subscriber_id = %id, error = %e, "websocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unsubscribe(id);
}
