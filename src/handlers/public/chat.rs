// handlers/public/chat.rs - GET /chat websocket

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::chat::ChatHub;
use crate::server::AppState;

pub async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.chat.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: ChatHub) {
    let (mut sender, mut receiver) = socket.split();
    // subscribe before reading so the sender sees its own messages
    let mut rx = hub.subscribe();
    tracing::info!("chat client connected ({} online)", hub.connected());

    let mut forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    if sender.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("chat client lagging, skipped {} messages", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let publisher = hub.clone();
    let mut read = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    if let Err(e) = publisher.publish(&text) {
                        tracing::debug!("dropping chat frame: {}", e);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut forward => read.abort(),
        _ = &mut read => forward.abort(),
    }
    tracing::info!("chat client disconnected");
}
