//! Integration tests against the real OpenAI API.
//!
//! These tests require OPENAI_API_KEY to be set.
//!
//! Run with: cargo test --features integ_test --test openai_live

#[cfg(feature = "integ_test")]
mod tests {
    use twitchgpt::chatbot::CompletionClient;
    use twitchgpt::config::GptMode;
    use twitchgpt::openai::Client;

    fn api_key() -> Option<String> {
        std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
    }

    /// A chat-mode call returns a non-empty answer and records the exchange.
    #[tokio::test]
    async fn test_chat_roundtrip() {
        let Some(key) = api_key() else {
            eprintln!("Skipping test: OPENAI_API_KEY not set");
            return;
        };

        let completion = CompletionClient::with_client(
            Client::new(key, "https://api.openai.com".into()),
            GptMode::Chat,
            "gpt-3.5-turbo",
            "gpt-3.5-turbo-instruct",
            "You are a helpful Twitch Chatbot. Answer in one short sentence.",
            5,
        );

        let answer = completion.complete("Say hello to chat.").await;
        assert!(answer.is_ok(), "Completion failed: {:?}", answer.err());
        assert!(!answer.unwrap().trim().is_empty());
        assert_eq!(completion.history_len().await, 2);
    }
}
