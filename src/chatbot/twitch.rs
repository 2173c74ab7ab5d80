//! Twitch client using twitch-irc.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use twitch_irc::login::StaticLoginCredentials;
use twitch_irc::message::ServerMessage;
use twitch_irc::{ClientConfig, SecureTCPTransport, TwitchIRCClient};

use crate::chatbot::sink::{ChatSink, ConnectorError};

type IrcClient = TwitchIRCClient<SecureTCPTransport, StaticLoginCredentials>;

/// Twitch chat client.
#[derive(Clone)]
pub struct TwitchClient {
    client: IrcClient,
    login: String,
}

impl TwitchClient {
    /// Create a client and the channel of incoming server messages.
    ///
    /// Without credentials the client logs in anonymously and can read but not send.
    pub fn new(login: &str, token: &str) -> (UnboundedReceiver<ServerMessage>, Self) {
        let credentials = if login.is_empty() || token.is_empty() {
            warn!("Missing Twitch credentials, connecting anonymously (read-only)");
            StaticLoginCredentials::anonymous()
        } else {
            StaticLoginCredentials::new(login.to_string(), Some(token.to_string()))
        };

        let config = ClientConfig::new_simple(credentials);
        let (incoming, client) = IrcClient::new(config);
        (
            incoming,
            Self {
                client,
                login: login.to_string(),
            },
        )
    }

    /// Bot login this client speaks as.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Join every channel. The connection is opened lazily by the first join.
    pub fn join_all(&self, channels: &[String]) -> Result<(), ConnectorError> {
        for channel in channels {
            info!("* Joining {}", channel);
            self.client
                .join(channel.clone())
                .map_err(|e| ConnectorError::Join {
                    channel: channel.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ChatSink for TwitchClient {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ConnectorError> {
        self.client
            .say(channel.to_string(), text.to_string())
            .await
            .map_err(|e| ConnectorError::Send {
                channel: channel.to_string(),
                reason: e.to_string(),
            })
    }
}
