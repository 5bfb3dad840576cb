use std::path::Path;

use futures::StreamExt;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::config::{ElevenLabsVoice, VoiceSettings};
use crate::error::{ReelError, Result};
use crate::services::tts::SpeechSynthesizer;

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";

/// ElevenLabs text-to-speech client
///
/// The response body is streamed to disk chunk by chunk.
pub struct ElevenLabsSpeech {
    client: Client,
    api_key: String,
    voice: ElevenLabsVoice,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: String, voice: ElevenLabsVoice) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ReelError::Configuration("ElevenLabs API key is required for TTS generation".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            voice,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/text-to-speech/{}", ELEVENLABS_API_BASE, self.voice.model_id)
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        info!("Generating speech using ElevenLabs ({})", self.voice.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.voice.model,
                voice_settings: &self.voice.voice_settings,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await?;
            return Err(ReelError::Api(format!("ElevenLabs TTS failed (HTTP {}): {}", status, error)));
        }

        let mut file = tokio::fs::File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        debug!("Wrote {} bytes", written);
        info!("Audio saved to {}", output_path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}
