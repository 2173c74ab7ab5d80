//! Command router - decides which chat messages reach the model and
//! delivers the answers back to chat.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chatbot::completion::CompletionClient;
use crate::chatbot::dispatch::{split_chunks, ChunkScheduler};
use crate::chatbot::message::ChatEvent;
use crate::chatbot::notify::AudioNotifier;
use crate::chatbot::tts::TtsClient;
use crate::config::{Config, MAX_MESSAGE_LENGTH};
use crate::openai::UpstreamError;

/// Router settings taken from the process configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Trigger keywords, lowercased.
    pub commands: Vec<String>,
    /// Channels that HTTP answers are relayed to.
    pub channels: Vec<String>,
    pub send_username: bool,
    pub enable_channel_points: bool,
    pub channel_points_reward_id: Option<String>,
    pub max_message_length: usize,
}

impl From<&Config> for RouterConfig {
    fn from(config: &Config) -> Self {
        Self {
            commands: config.commands.clone(),
            channels: config.channels.clone(),
            send_username: config.send_username,
            enable_channel_points: config.enable_channel_points,
            channel_points_reward_id: config.channel_points_reward_id.clone(),
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }
}

pub struct CommandRouter {
    config: RouterConfig,
    completion: CompletionClient,
    scheduler: Arc<ChunkScheduler>,
    tts: Option<TtsClient>,
    notifier: AudioNotifier,
}

impl CommandRouter {
    pub fn new(
        config: RouterConfig,
        completion: CompletionClient,
        scheduler: Arc<ChunkScheduler>,
        tts: Option<TtsClient>,
        notifier: AudioNotifier,
    ) -> Self {
        Self {
            config,
            completion,
            scheduler,
            tts,
            notifier,
        }
    }

    pub fn scheduler(&self) -> &Arc<ChunkScheduler> {
        &self.scheduler
    }

    /// Decide whether `event` is a command and build the model input for it.
    pub fn extract_input(&self, event: &ChatEvent) -> Option<String> {
        if event.is_self {
            return None;
        }

        if self.config.enable_channel_points && self.is_redemption(event) {
            info!("🎁 Channel point redemption from {}", event.sender_name);
            return Some(event.text.clone());
        }

        let rest = self
            .config
            .commands
            .iter()
            .filter_map(|trigger| strip_trigger(&event.text, trigger).map(|rest| (trigger.len(), rest)))
            .max_by_key(|(len, _)| *len)
            .map(|(_, rest)| rest.trim())?;

        info!("Command recognized: {}", event.text);
        if self.config.send_username {
            Some(format!("Message from user {}: {}", event.sender_login, rest))
        } else {
            Some(rest.to_string())
        }
    }

    fn is_redemption(&self, event: &ChatEvent) -> bool {
        if event.is_highlighted() {
            return true;
        }
        match (&self.config.channel_points_reward_id, &event.reward_id) {
            (Some(wanted), Some(got)) => wanted == got,
            _ => false,
        }
    }

    /// Handle a chat event end to end. Returns the model's answer if one was sent.
    pub async fn handle(&self, event: &ChatEvent) -> Option<String> {
        let input = self.extract_input(event)?;

        let response = match self.completion.complete(&input).await {
            Ok(response) => response,
            Err(e) => {
                error!("Completion failed for {} in #{}: {}", event.sender_name, event.channel, e);
                return None;
            }
        };
        info!("🤖 Response for {}: {}", event.sender_name, response);

        self.relay(&event.channel, &response).await;
        self.speak(&response).await;
        Some(response)
    }

    /// Answer free text from outside chat (the HTTP endpoint).
    ///
    /// The answer is relayed to every configured channel and returned unsplit.
    pub async fn answer(&self, text: &str) -> Result<String, UpstreamError> {
        let response = self.completion.complete(text).await?;
        for channel in &self.config.channels {
            self.relay(channel, &response).await;
        }
        Ok(response)
    }

    /// Split `response` to the chat limit and queue the parts for `channel`.
    pub async fn relay(&self, channel: &str, response: &str) -> usize {
        let chunks = split_chunks(response, self.config.max_message_length);
        if chunks.len() > 1 {
            info!("✂️ Splitting response for #{} into {} parts", channel, chunks.len());
        }
        self.scheduler.schedule(channel, chunks).await
    }

    async fn speak(&self, response: &str) {
        let Some(ref tts) = self.tts else {
            return;
        };
        match tts.synthesize(response).await {
            Ok(_) => {
                self.notifier.notify();
            }
            Err(e) => warn!("TTS failed: {e}"),
        }
    }
}

/// Strip `trigger` from the start of `text`, comparing case-insensitively.
///
/// `trigger` must already be lowercase. Only the matched prefix is removed.
fn strip_trigger<'a>(text: &'a str, trigger: &str) -> Option<&'a str> {
    if trigger.is_empty() {
        return None;
    }
    let boundaries = text
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));

    for end in boundaries {
        let head = text[..end].to_lowercase();
        if head == trigger {
            return Some(&text[end..]);
        }
        if head.len() >= trigger.len() {
            break;
        }
    }
    None
}
