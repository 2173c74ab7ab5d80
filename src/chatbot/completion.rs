//! Completion client - turns user input into a model answer.
//!
//! In chat mode every call extends a rolling history that is sent in full.
//! In prompt mode the context file is prepended to a single free-text prompt.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chatbot::history::{History, Record, Role};
use crate::config::{Config, GptMode};
use crate::openai::{Client, UpstreamError};

/// Build the free-text prompt used in PROMPT mode.
pub fn build_prompt(context: &str, text: &str) -> String {
    format!("{context}\n\nUser: {text}\nAgent:")
}

pub struct CompletionClient {
    api: Client,
    mode: GptMode,
    chat_model: String,
    prompt_model: String,
    context: String,
    /// Held for the whole request so overlapping chat calls never interleave.
    history: Mutex<History>,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Self {
        let api = Client::new(config.openai_api_key.clone(), config.openai_base_url.clone());
        Self::with_client(
            api,
            config.mode,
            &config.model_name,
            &config.completion_model_name,
            &config.context,
            config.history_length,
        )
    }

    pub fn with_client(
        api: Client,
        mode: GptMode,
        chat_model: &str,
        prompt_model: &str,
        context: &str,
        history_length: usize,
    ) -> Self {
        Self {
            api,
            mode,
            chat_model: chat_model.to_string(),
            prompt_model: prompt_model.to_string(),
            context: context.to_string(),
            history: Mutex::new(History::new(context, history_length)),
        }
    }

    /// Produce an answer for `text` according to the configured mode.
    pub async fn complete(&self, text: &str) -> Result<String, UpstreamError> {
        match self.mode {
            GptMode::Chat => self.chat(text).await,
            GptMode::Prompt => self.prompt(text).await,
        }
    }

    async fn chat(&self, text: &str) -> Result<String, UpstreamError> {
        let mut history = self.history.lock().await;
        debug!("Conversations in history: {}/{}", history.len() / 2, history.capacity() / 2);

        // The turn is only stored once the API has answered it.
        let turn = Record::new(Role::User, text);
        match self.api.chat(&self.chat_model, history.with_turn(&turn)).await {
            Ok(answer) => {
                history.commit(text, &answer);
                Ok(answer)
            }
            Err(e) => {
                warn!("Chat completion failed: {e}");
                Err(e)
            }
        }
    }

    async fn prompt(&self, text: &str) -> Result<String, UpstreamError> {
        let prompt = build_prompt(&self.context, text);
        info!("🤖 Sending prompt ({} chars)", prompt.len());
        self.api.complete(&self.prompt_model, &prompt).await
    }

    /// Current number of history records, excluding the system record.
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn chat_body(content: &str) -> String {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    fn client(url: &str, mode: GptMode, history_length: usize) -> CompletionClient {
        CompletionClient::with_client(
            Client::new("test-key".into(), url.to_string()),
            mode,
            "gpt-3.5-turbo",
            "gpt-3.5-turbo-instruct",
            "You are a test bot.",
            history_length,
        )
    }

    #[test]
    fn test_build_prompt() {
        assert_eq!(build_prompt("ctx", "hello"), "ctx\n\nUser: hello\nAgent:");
    }

    #[tokio::test]
    async fn test_chat_mode_sends_history() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "You are a test bot."},
                    {"role": "user", "content": "one"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("first answer"))
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "You are a test bot."},
                    {"role": "user", "content": "one"},
                    {"role": "assistant", "content": "first answer"},
                    {"role": "user", "content": "two"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("second answer"))
            .create_async()
            .await;

        let completion = client(&server.url(), GptMode::Chat, 5);
        assert_eq!(completion.complete("one").await.unwrap(), "first answer");
        assert_eq!(completion.complete("two").await.unwrap(), "second answer");
        assert_eq!(completion.history_len().await, 4);

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_stays_bounded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("ok"))
            .expect(6)
            .create_async()
            .await;

        let completion = client(&server.url(), GptMode::Chat, 2);
        for i in 0..6 {
            completion.complete(&format!("question {i}")).await.unwrap();
            assert!(completion.history_len().await <= 4);
        }
    }

    #[tokio::test]
    async fn test_prompt_mode_ignores_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/completions")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "You are a test bot.\n\nUser: hello\nAgent:"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"text": " Ahoy!", "index": 0}]}"#)
            .expect(2)
            .create_async()
            .await;

        let completion = client(&server.url(), GptMode::Prompt, 5);
        assert_eq!(completion.complete("hello").await.unwrap(), " Ahoy!");
        assert_eq!(completion.complete("hello").await.unwrap(), " Ahoy!");
        assert_eq!(completion.history_len().await, 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_call_rolls_back_user_turn() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let completion = client(&server.url(), GptMode::Chat, 5);
        let err = completion.complete("hello").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Api { status: 500, .. }));
        assert_eq!(completion.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_call_keeps_earlier_exchange() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "You are a test bot."},
                    {"role": "user", "content": "q1"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body("a1"))
            .create_async()
            .await;
        let failing = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "You are a test bot."},
                    {"role": "user", "content": "q2"}
                ]
            })))
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let completion = client(&server.url(), GptMode::Chat, 1);
        assert_eq!(completion.complete("q1").await.unwrap(), "a1");
        assert!(completion.complete("q2").await.is_err());
        assert_eq!(completion.history_len().await, 2);

        ok.assert_async().await;
        failing.assert_async().await;
    }
}
