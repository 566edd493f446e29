// chat/mod.rs - broadcast hub for the real-time chat channel
//
// Every accepted frame goes to every connected client, sender included.
// Nothing is persisted; slow receivers skip what they missed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

pub const MESSAGE_EVENT: &str = "message";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user: String,
    pub message: String,
    pub timestamp: Value,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    data: ChatMessage,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("malformed chat frame: {0}")]
    Malformed(String),

    #[error("unsupported chat event '{0}'")]
    UnsupportedEvent(String),
}

/// Validate a client frame: `{"event":"message","data":{user,message,timestamp}}`.
pub fn parse_frame(frame: &str) -> Result<ChatMessage, ChatError> {
    let envelope: Envelope = serde_json::from_str(frame).map_err(|e| ChatError::Malformed(e.to_string()))?;
    if envelope.event != MESSAGE_EVENT {
        return Err(ChatError::UnsupportedEvent(envelope.event));
    }
    Ok(envelope.data)
}

/// Build the wire frame for a message.
pub fn message_frame(message: &ChatMessage) -> String {
    serde_json::json!({ "event": MESSAGE_EVENT, "data": message }).to_string()
}

#[derive(Debug, Clone)]
pub struct ChatHub {
    tx: broadcast::Sender<String>,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn connected(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Validate `frame` and fan it out unchanged. Returns how many clients got it.
    pub fn publish(&self, frame: &str) -> Result<usize, ChatError> {
        let message = parse_frame(frame)?;
        tracing::debug!(user = %message.user, "chat message");
        // no subscribers is not an error
        Ok(self.tx.send(frame.to_string()).unwrap_or(0))
    }
}
