//! Text-to-speech using the OpenAI speech endpoint.
//!
//! The synthesized MP3 overwrites a single file in the public directory,
//! which the landing page plays back when notified.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::openai::{Client, UpstreamError};

/// File name of the synthesized audio inside the public directory.
pub const AUDIO_FILE: &str = "file.mp3";

/// TTS client for the OpenAI speech API.
pub struct TtsClient {
    api: Client,
    model: String,
    voice: String,
    output: PathBuf,
}

impl TtsClient {
    pub fn new(config: &Config) -> Self {
        let api = Client::new(config.openai_api_key.clone(), config.openai_base_url.clone());
        Self::with_client(api, &config.tts_model, &config.tts_voice, &config.public_dir)
    }

    pub fn with_client(api: Client, model: &str, voice: &str, public_dir: &Path) -> Self {
        Self {
            api,
            model: model.to_string(),
            voice: voice.to_string(),
            output: public_dir.join(AUDIO_FILE),
        }
    }

    /// Path the audio is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Generate speech from text and write it to the output file.
    pub async fn synthesize(&self, text: &str) -> Result<PathBuf, UpstreamError> {
        let preview: String = text.chars().take(50).collect();
        info!("🔊 TTS: \"{}\"", preview);

        let audio = self.api.speech(&self.model, &self.voice, text).await?;
        debug!("Got {} bytes of MP3 audio", audio.len());

        if let Some(parent) = self.output.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(UpstreamError::Io)?;
        }
        tokio::fs::write(&self.output, &audio)
            .await
            .map_err(UpstreamError::Io)?;

        info!("Saved voice audio to {}", self.output.display());
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthesize_writes_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/audio/speech")
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(b"ID3fake-mp3")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        let tts = TtsClient::with_client(Client::new("k".into(), server.url()), "tts-1", "alloy", &public);

        let path = tts.synthesize("hello chat").await.unwrap();
        assert_eq!(path, public.join(AUDIO_FILE));
        assert_eq!(std::fs::read(path).unwrap(), b"ID3fake-mp3");
    }

    #[tokio::test]
    async fn test_synthesize_propagates_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/audio/speech")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let tts = TtsClient::with_client(Client::new("k".into(), server.url()), "tts-1", "alloy", dir.path());

        let err = tts.synthesize("hello").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Api { status: 401, .. }));
        assert!(!tts.output().exists());
    }
}
