//! Outbound side of the chat connection.

use async_trait::async_trait;
use std::fmt;

/// Chat link failure.
#[derive(Debug)]
pub enum ConnectorError {
    Join { channel: String, reason: String },
    Send { channel: String, reason: String },
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join { channel, reason } => write!(f, "failed to join #{channel}: {reason}"),
            Self::Send { channel, reason } => write!(f, "failed to send to #{channel}: {reason}"),
        }
    }
}

impl std::error::Error for ConnectorError {}

/// Anything that can post a message to a chat channel.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ConnectorError>;
}
