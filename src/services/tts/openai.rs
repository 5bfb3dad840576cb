use std::path::Path;

use log::info;
use reqwest::Client;
use serde_json::json;

use crate::config::OpenAiVoice;
use crate::error::{ReelError, Result};
use crate::services::OPENAI_API_BASE;
use crate::services::tts::SpeechSynthesizer;

/// OpenAI `/audio/speech` client
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    voice: OpenAiVoice,
}

impl OpenAiSpeech {
    pub fn new(api_key: String, voice: OpenAiVoice) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ReelError::Configuration("OpenAI API key is required for TTS generation".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            voice,
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        json!({
            "model": self.voice.model,
            "voice": self.voice.voice,
            "input": text,
        })
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        info!("Generating speech using OpenAI TTS ({}, {})", self.voice.model, self.voice.voice);

        let response = self
            .client
            .post(format!("{}/audio/speech", OPENAI_API_BASE))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await?;
            return Err(ReelError::Api(format!("OpenAI TTS failed (HTTP {}): {}", status, error)));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(output_path, &bytes).await?;
        info!("Audio saved to {} ({} bytes)", output_path.display(), bytes.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let speech = OpenAiSpeech::new("sk-test".to_string(), OpenAiVoice::default()).unwrap();
        let body = speech.request_body("hello");
        assert_eq!(body["model"], "tts-1-hd");
        assert_eq!(body["voice"], "onyx");
        assert_eq!(body["input"], "hello");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(OpenAiSpeech::new(String::new(), OpenAiVoice::default()).is_err());
    }
}
