//! Bot engine - consumes Twitch server messages and feeds the router.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use twitch_irc::message::ServerMessage;

use crate::chatbot::message::ChatEvent;
use crate::chatbot::router::CommandRouter;
use crate::chatbot::sink::ChatSink;

/// The bot engine.
pub struct BotEngine {
    bot_login: String,
    router: Arc<CommandRouter>,
    sink: Arc<dyn ChatSink>,
    /// Channels already greeted in this process.
    greeted: Mutex<HashSet<String>>,
}

impl BotEngine {
    pub fn new(bot_login: &str, router: Arc<CommandRouter>, sink: Arc<dyn ChatSink>) -> Self {
        Self {
            bot_login: bot_login.to_lowercase(),
            router,
            sink,
            greeted: Mutex::new(HashSet::new()),
        }
    }

    /// Process server messages until the stream closes.
    ///
    /// The stream stays open for as long as any `TwitchClient` clone is alive,
    /// so while the bot runs a server RECONNECT is what drops queued chunks.
    /// Closing the stream does the same on shutdown.
    pub async fn run(self: Arc<Self>, mut incoming: UnboundedReceiver<ServerMessage>) {
        while let Some(message) = incoming.recv().await {
            self.handle_server_message(message).await;
        }

        warn!("Message stream closed, dropping queued messages");
        self.router.scheduler().cancel_all().await;
    }

    /// Handle one server message. Chat messages are routed on their own task.
    pub async fn handle_server_message(self: &Arc<Self>, message: ServerMessage) {
        match message {
            ServerMessage::Privmsg(msg) => {
                let event = ChatEvent::from_privmsg(&msg, &self.bot_login);
                if event.is_self {
                    return;
                }
                info!("📨 Received message from {} in #{}: {}", event.sender_login, event.channel, event.text);

                let engine = self.clone();
                tokio::spawn(async move {
                    engine.router.handle(&event).await;
                });
            }
            ServerMessage::Join(join) => {
                if join.user_login.eq_ignore_ascii_case(&self.bot_login) {
                    info!("* Joined #{}", join.channel_login);
                    self.greet(&join.channel_login).await;
                }
            }
            ServerMessage::Notice(notice) => {
                let channel = notice.channel_login.as_deref().unwrap_or("-");
                warn!("Notice in #{}: {}", channel, notice.message_text);
            }
            ServerMessage::Reconnect(_) => {
                warn!("Server requested reconnect, dropping queued messages");
                self.router.scheduler().cancel_all().await;
            }
            ServerMessage::GlobalUserState(_) => {
                info!("* Connected to Twitch as {}", self.bot_login);
            }
            other => debug!("Ignoring server message: {:?}", other),
        }
    }

    /// Say hello the first time a channel is joined.
    async fn greet(&self, channel: &str) {
        if self.bot_login.is_empty() {
            return;
        }
        {
            let mut greeted = self.greeted.lock().await;
            if !greeted.insert(channel.to_string()) {
                return;
            }
        }

        let greeting = format!("Hello {}! I am {}, here to assist!", channel, self.bot_login);
        if let Err(e) = self.sink.say(channel, &greeting).await {
            warn!("{e}");
        }
    }
}
