//! Test utilities for integration tests
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};

use twitchgpt::chatbot::{
    AudioNotifier, ChatSink, ChunkScheduler, CommandRouter, CompletionClient, ConnectorError,
    RouterConfig,
};
use twitchgpt::config::GptMode;
use twitchgpt::openai::Client;
use twitchgpt::web::{AppState, LandingPage, app};

/// Chat sink that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ConnectorError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

/// Creates a test application router talking to a fake model API at
/// `api_url` and serving static files from `public_dir`.
pub fn test_app(
    api_url: &str,
    mode: GptMode,
    public_dir: &Path,
) -> (Router, Arc<RecordingSink>, AudioNotifier) {
    let sink = Arc::new(RecordingSink::default());
    let completion = CompletionClient::with_client(
        Client::new("test-key".into(), api_url.to_string()),
        mode,
        "gpt-3.5-turbo",
        "gpt-3.5-turbo-instruct",
        "You are a test bot.",
        5,
    );
    let config = RouterConfig {
        commands: vec!["!gpt".into()],
        channels: vec!["testchannel".into()],
        send_username: true,
        enable_channel_points: false,
        channel_points_reward_id: None,
        max_message_length: 399,
    };
    let scheduler = Arc::new(ChunkScheduler::new(sink.clone(), Duration::from_millis(10)));
    let notifier = AudioNotifier::new();
    let router = Arc::new(CommandRouter::new(
        config,
        completion,
        scheduler,
        None,
        notifier.clone(),
    ));
    let landing = LandingPage {
        bot: "gptbot".into(),
        channels: vec!["testchannel".into()],
        tts: true,
    };
    let state = Arc::new(AppState::new(
        router,
        notifier.clone(),
        landing,
        public_dir.to_path_buf(),
    ));

    (app(state), sink, notifier)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
