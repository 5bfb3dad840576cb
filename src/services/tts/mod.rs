//! Text-to-speech providers
//!
//! Each provider writes the synthesized narration straight to a file.

use std::path::Path;

use crate::config::AppConfig;
use crate::error::{ReelError, Result};
use crate::utils::common::api_key_from_env;

pub mod elevenlabs;
pub mod openai;

pub use elevenlabs::ElevenLabsSpeech;
pub use openai::OpenAiSpeech;

/// Trait that every speech provider implements
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and write the audio to `output_path`
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Get the speech provider configured under `name`
pub fn speech_provider(name: &str, config: &AppConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    match name.to_ascii_lowercase().as_str() {
        "openai" => Ok(Box::new(OpenAiSpeech::new(
            api_key_from_env("OPENAI_API_KEY")?,
            config.audio_settings.openai.clone(),
        )?)),
        "elevenlabs" => Ok(Box::new(ElevenLabsSpeech::new(
            api_key_from_env("ELEVENLABS_API_KEY")?,
            config.audio_settings.elevenlabs.clone(),
        )?)),
        _ => Err(ReelError::Configuration(format!("Unknown audio provider: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let err = speech_provider("polly", &AppConfig::default()).err().unwrap();
        assert!(matches!(err, ReelError::Configuration(msg) if msg == "Unknown audio provider: polly"));
    }
}
