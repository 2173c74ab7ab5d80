use serde::{Deserialize, Serialize};

use crate::chatbot::history::Record;

const TEMPERATURE: f32 = 1.0;
const MAX_TOKENS: u32 = 256;

pub struct Client {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a Record>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl Client {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Run a chat completion over the given records and return the first choice.
    pub async fn chat(&self, model: &str, messages: Vec<&Record>) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        let response = self.post("/v1/chat/completions", &request).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(UpstreamError::Empty)
    }

    /// Run a legacy free-text completion and return the raw text of the first choice.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, UpstreamError> {
        let request = CompletionRequest {
            model,
            prompt,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        let response = self.post("/v1/completions", &request).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(UpstreamError::Empty)
    }

    /// Synthesize speech and return the encoded MP3 bytes.
    pub async fn speech(&self, model: &str, voice: &str, input: &str) -> Result<Vec<u8>, UpstreamError> {
        let request = SpeechRequest { model, voice, input };
        let response = self.post("/v1/audio/speech", &request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Http(e.to_string()))?;
        if bytes.is_empty() {
            return Err(UpstreamError::Empty);
        }
        Ok(bytes.to_vec())
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api { status, body });
        }

        Ok(response)
    }
}

/// Failure talking to the model or speech API.
#[derive(Debug)]
pub enum UpstreamError {
    Http(String),
    Api { status: u16, body: String },
    Parse(String),
    Empty,
    Io(std::io::Error),
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Http(e) => write!(f, "HTTP error: {e}"),
            UpstreamError::Api { status, body } => write!(f, "API error: {status}: {body}"),
            UpstreamError::Parse(e) => write!(f, "Parse error: {e}"),
            UpstreamError::Empty => write!(f, "Empty response"),
            UpstreamError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Io(e) => Some(e),
            _ => None,
        }
    }
}
